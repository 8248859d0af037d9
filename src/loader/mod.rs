pub mod admission;
pub mod sample_loader;

use std::path::PathBuf;

use crate::audio_api::Sound;
use admission::{LoadHandle, LoadOutcome};

/// Starts resolving a path into a sound without blocking the caller. The result comes
/// back later, exactly once per handle, as a `Completion`.
pub trait Loader {
    type Sound: Sound;

    fn begin(&mut self, handle: LoadHandle, path: &str);
}

/// A finished load, posted from the loader's thread and handed to
/// `LoadAdmissionQueue::on_resolved` on the sequencer's thread.
#[derive(Debug)]
pub struct Completion<S> {
    pub handle: LoadHandle,
    pub outcome: LoadOutcome<S>,
}

// Display always names the path; the string goes straight to the status line.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("cannot open sound {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode sound {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("unsupported sound {path}: {detail}")]
    Unsupported { path: PathBuf, detail: String },
}
