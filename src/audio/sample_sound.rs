use std::time::Duration;

use crossbeam_channel::Sender;

use super::sample_id::SampleId;
use crate::audio_api::{AudioCommand, Sound, TriggerParams};

/// A sample registered with the engine. Every call turns into a command for the
/// audio thread; nothing here blocks. Dropping the sound frees its buffer on the
/// audio side, so there is exactly one owner per registered sample.
#[derive(Debug)]
pub struct SampleSound {
    id: SampleId,
    source: String,
    gain: f32,
    tx: Sender<AudioCommand>,
}

impl SampleSound {
    pub fn new(id: SampleId, source: String, tx: Sender<AudioCommand>) -> Self {
        Self { id, source, gain: 1.0, tx }
    }

    pub fn id(&self) -> SampleId {
        self.id
    }

    fn send(&self, cmd: AudioCommand) {
        // a full queue drops the command; a late hit is worse than a missing one
        if self.tx.try_send(cmd).is_err() {
            log::debug!(
                target: "qbeat::audio",
                "audio queue full, dropped command for {}",
                self.source
            );
        }
    }
}

// long enough for a few audio callbacks to drain the queue
const UNREGISTER_WAIT: Duration = Duration::from_millis(20);

impl Drop for SampleSound {
    fn drop(&mut self) {
        if self.tx.send_timeout(AudioCommand::Unregister(self.id), UNREGISTER_WAIT).is_err() {
            log::warn!(target: "qbeat::audio", "could not free sample for {}", self.source);
        }
    }
}

impl Sound for SampleSound {
    fn play(&mut self) {
        self.send(AudioCommand::Trigger(TriggerParams { sample_id: self.id, gain: self.gain }));
    }

    fn stop(&mut self) {
        self.send(AudioCommand::Stop(self.id));
    }

    fn set_volume(&mut self, volume: f32) {
        self.gain = volume.clamp(0.0, 1.0);
        self.send(AudioCommand::SetGain { id: self.id, gain: self.gain });
    }

    fn source(&self) -> &str {
        &self.source
    }
}
