// Admission queue for sound loads.
//
// `submit` hands a path to the loader and returns at once; the loader reports back with
// `on_resolved` (on the sequencer's own thread, see loader::Completion). The queue owns each
// request from submission until that report, then the result either moves into the
// beat map (ready) or is reported and dropped (error). There is no cancel.

use std::collections::HashMap;

use super::{LoadError, Loader};
use crate::audio_api::Sound;
use crate::middle::EventSink;

// opaque, unique per submitted request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoadHandle(u64);

#[derive(Clone, Debug, PartialEq)]
pub struct LoadRequest {
    pub path: String,
    pub seed: Option<Vec<bool>>, // row pattern known before the sound exists (project restore)
}

#[derive(Debug)]
pub enum LoadOutcome<S> {
    Ready(S),
    Error(LoadError),
}

/// Whoever takes ownership of a resolved sound. Returns the new row and a view of the
/// installed sound so the UI can draw it.
pub trait Install<S> {
    fn install(&mut self, sound: S, seed: Option<&[bool]>) -> (usize, &S);
}

pub struct LoadAdmissionQueue<L: Loader> {
    loader: L,
    next_handle: u64,
    pending: HashMap<LoadHandle, LoadRequest>,
}

impl<L: Loader> LoadAdmissionQueue<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            next_handle: 0,
            pending: HashMap::new(),
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, handle: LoadHandle) -> bool {
        self.pending.contains_key(&handle)
    }

    /// An empty path means nothing was selected; nothing is queued and `None` comes back.
    pub fn submit(&mut self, path: &str, seed: Option<Vec<bool>>) -> Option<LoadHandle> {
        if path.is_empty() {
            return None;
        }
        let handle = LoadHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.insert(handle, LoadRequest { path: path.to_string(), seed });
        log::debug!(target: "qbeat::loader", "queued {:?} for {}", handle, path);
        self.loader.begin(handle, path);
        Some(handle)
    }

    /// First report for a handle wins; anything after that (or for a handle we never
    /// issued) is ignored and returns false.
    pub fn on_resolved<I, E>(
        &mut self,
        handle: LoadHandle,
        outcome: LoadOutcome<L::Sound>,
        installer: &mut I,
        sink: &mut E,
    ) -> bool
    where
        I: Install<L::Sound>,
        E: EventSink<L::Sound>,
    {
        let Some(request) = self.pending.remove(&handle) else {
            log::debug!(
                target: "qbeat::loader",
                "ignoring repeat or unknown completion {:?}",
                handle
            );
            return false;
        };

        match outcome {
            LoadOutcome::Ready(sound) => {
                // install before draw: the row index comes from the install
                let (row, sound) = installer.install(sound, request.seed.as_deref());
                log::info!(target: "qbeat::loader", "loaded {} into row {}", sound.source(), row);
                sink.draw_sound(row, sound);
                sink.refresh_view();
            }
            LoadOutcome::Error(err) => {
                log::warn!(target: "qbeat::loader", "{}", err);
                sink.notify(&err.to_string());
            }
        }
        true
    }
}
