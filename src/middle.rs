// The middle layer: the UI sends `UiEvent`s in, the event loop feeds ticks and load
// completions in, and all the UI ever gets back is the three `EventSink` calls.
// Nothing that fails in here stops playback; every failure becomes one notify() line.

use std::path::Path;

use crate::loader::Loader;
use crate::loader::admission::{LoadAdmissionQueue, LoadHandle, LoadOutcome};
use crate::pipeline::persistence::{Storage, storage_for};
use crate::pipeline::playback::PlaybackController;
use crate::pipeline::project::ProjectState;
use crate::pipeline::scheduler::{Clock, SystemClock, Timer};
use crate::shared::UiEvent;

/// What the core tells the UI.
pub trait EventSink<S> {
    /// A sound was installed as `row`; render a line for it.
    fn draw_sound(&mut self, row: usize, sound: &S);
    /// Geometry or contents changed; redraw the whole grid.
    fn refresh_view(&mut self);
    /// Human readable failure for the status line.
    fn notify(&mut self, message: &str);
}

pub struct Middle<L, T, E, C = SystemClock>
where
    L: Loader,
    T: Timer,
    E: EventSink<L::Sound>,
    C: Clock,
{
    player: PlaybackController<L::Sound, T, C>,
    queue: LoadAdmissionQueue<L>,
    events: E,
    storage: Option<Box<dyn Storage>>, // None = pick the format from the file extension
}

impl<L, T, E, C> Middle<L, T, E, C>
where
    L: Loader,
    T: Timer,
    E: EventSink<L::Sound>,
    C: Clock,
{
    pub fn new(player: PlaybackController<L::Sound, T, C>, loader: L, events: E) -> Self {
        Self {
            player,
            queue: LoadAdmissionQueue::new(loader),
            events,
            storage: None,
        }
    }

    pub fn with_storage(mut self, storage: Box<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn player(&self) -> &PlaybackController<L::Sound, T, C> {
        &self.player
    }

    pub fn queue(&self) -> &LoadAdmissionQueue<L> {
        &self.queue
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn pending_loads(&self) -> usize {
        self.queue.pending_count()
    }

    pub fn tick(&mut self) -> bool {
        self.player.tick()
    }

    pub fn on_resolved(&mut self, handle: LoadHandle, outcome: LoadOutcome<L::Sound>) -> bool {
        self.queue.on_resolved(handle, outcome, &mut self.player, &mut self.events)
    }

    pub fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Toggle { row, beat } => self.player.toggle(row, beat),
            UiEvent::AddSound(path) => {
                self.queue.submit(&path, None);
            }
            UiEvent::RemoveSound(row) => {
                if self.player.remove_sound(row) {
                    self.events.refresh_view();
                }
            }
            UiEvent::Clear => {
                self.player.clear();
                self.events.refresh_view();
            }
            UiEvent::Resize { time_signature, tact_count } => {
                match self.player.resize(time_signature, tact_count) {
                    Ok(()) => self.events.refresh_view(),
                    Err(e) => self.report(&e.to_string()),
                }
            }
            UiEvent::SetBpm(bpm) => {
                if let Err(e) = self.player.set_bpm(bpm) {
                    self.report(&e.to_string());
                }
            }
            UiEvent::SetVolume(volume) => self.player.set_volume(volume),
            UiEvent::TurnOn => self.player.turn_on(),
            UiEvent::TurnOff => self.player.turn_off(),
            UiEvent::TogglePlay => self.player.toggle_on(),
            UiEvent::ResetCursor => self.player.reset_cursor(),
            UiEvent::LoadProject(path) => self.load_project(&path),
            UiEvent::StoreProject(path) => self.store_project(&path),
        }
    }

    // The session is replaced: old rows go, saved settings (if any) apply, then every saved
    // row is queued. Rows that fail to load are reported and skipped.
    fn load_project(&mut self, path: &Path) {
        let restored = match &self.storage {
            Some(storage) => storage.restore(path),
            None => storage_for(path).restore(path),
        };
        let project = match restored {
            Ok(project) => project,
            Err(e) => return self.report(&format!("{e:#}")),
        };
        log::info!(
            target: "qbeat::project",
            "loading {} rows from {}",
            project.rows.len(),
            path.display()
        );

        self.player.remove_all_sounds();
        if let Some(settings) = project.settings {
            let applied = self
                .player
                .resize(settings.time_signature, settings.tact_count)
                .and_then(|()| self.player.set_bpm(settings.bpm));
            if let Err(e) = applied {
                self.report(&format!("{}: {e}", path.display()));
            }
            self.player.set_volume(settings.volume);
        }
        self.events.refresh_view();

        for row in project.rows {
            self.queue.submit(&row.sample_path, Some(row.pattern));
        }
    }

    fn store_project(&mut self, path: &Path) {
        let project = ProjectState::from_parts(
            self.player.sources(),
            self.player.snapshot(),
            Some(self.player.settings()),
        );
        let stored = match &self.storage {
            Some(storage) => storage.store(path, &project),
            None => storage_for(path).store(path, &project),
        };
        match stored {
            Ok(()) => log::info!(
                target: "qbeat::project",
                "stored {} rows to {}",
                project.rows.len(),
                path.display()
            ),
            Err(e) => self.report(&format!("{e:#}")),
        }
    }

    fn report(&mut self, message: &str) {
        log::warn!(target: "qbeat::middle", "{message}");
        self.events.notify(message);
    }
}
