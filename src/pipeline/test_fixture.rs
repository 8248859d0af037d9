// Purely for testing: stand-ins for every capability the core is handed (sound, clock,
// timer, loader, UI sink). They all record what happened so tests can assert on order.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::audio_api::Sound;
use crate::loader::Loader;
use crate::loader::admission::LoadHandle;
use crate::middle::EventSink;
use crate::pipeline::scheduler::{Clock, Timer};

#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { now: Rc::new(Cell::new(Instant::now())) }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[derive(Clone, Debug, Default)]
pub struct RecordingTimer {
    delays: Rc<RefCell<Vec<Duration>>>,
}

impl RecordingTimer {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.borrow().clone()
    }
}

impl Timer for RecordingTimer {
    fn arm(&mut self, delay: Duration) {
        self.delays.borrow_mut().push(delay);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SoundEvent {
    Played(String),
    Stopped(String),
    Volume(String, f32),
}

pub type SoundLog = Rc<RefCell<Vec<SoundEvent>>>;

#[derive(Debug)]
pub struct FakeSound {
    source: String,
    log: SoundLog,
}

impl FakeSound {
    pub fn new(source: &str, log: &SoundLog) -> Self {
        Self { source: source.to_string(), log: Rc::clone(log) }
    }
}

impl Sound for FakeSound {
    fn play(&mut self) {
        self.log.borrow_mut().push(SoundEvent::Played(self.source.clone()));
    }

    fn stop(&mut self) {
        self.log.borrow_mut().push(SoundEvent::Stopped(self.source.clone()));
    }

    fn set_volume(&mut self, volume: f32) {
        self.log.borrow_mut().push(SoundEvent::Volume(self.source.clone(), volume));
    }

    fn source(&self) -> &str {
        &self.source
    }
}

pub fn played(log: &SoundLog) -> Vec<String> {
    log.borrow()
        .iter()
        .filter_map(|e| match e {
            SoundEvent::Played(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub enum SinkEvent {
    Drawn(usize, String),
    Refreshed,
    Notified(String),
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn notifications(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Notified(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }
}

impl<S: Sound> EventSink<S> for RecordingSink {
    fn draw_sound(&mut self, row: usize, sound: &S) {
        self.events.push(SinkEvent::Drawn(row, sound.source().to_string()));
    }

    fn refresh_view(&mut self) {
        self.events.push(SinkEvent::Refreshed);
    }

    fn notify(&mut self, message: &str) {
        self.events.push(SinkEvent::Notified(message.to_string()));
    }
}

#[derive(Clone, Debug, Default)]
pub struct RecordingLoader {
    begun: Rc<RefCell<Vec<(LoadHandle, String)>>>,
}

impl RecordingLoader {
    pub fn begun(&self) -> Vec<(LoadHandle, String)> {
        self.begun.borrow().clone()
    }
}

impl Loader for RecordingLoader {
    type Sound = FakeSound;

    fn begin(&mut self, handle: LoadHandle, path: &str) {
        self.begun.borrow_mut().push((handle, path.to_string()));
    }
}
