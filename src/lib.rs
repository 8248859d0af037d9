//! qbeat - a beat-grid step sequencer engine
//!
//! The crate is split along the seams the app needs:
//! - `pipeline`: beat map, drift-correcting scheduler, playback controller, project storage
//! - `loader`: asynchronous sound loading and its admission queue
//! - `audio`: cpal output engine and the sample-backed `Sound`
//! - `middle`: routes UI events into the core and reports failures back out

pub mod audio;
pub mod audio_api;
pub mod config;
pub mod loader;
pub mod middle;
pub mod pipeline;
pub mod shared;

pub use audio_api::Sound;
pub use loader::admission::{LoadAdmissionQueue, LoadHandle, LoadOutcome};
pub use middle::{EventSink, Middle};
pub use pipeline::beat_map::BeatMap;
pub use pipeline::playback::PlaybackController;
pub use pipeline::scheduler::{Clock, DeadlineTimer, Scheduler, SystemClock, Timer};
pub use shared::{TimeSignature, UiEvent};
