pub use crate::audio::{SampleBuffer, SampleId};

/// What the sequencer core needs from a loaded sound.
///
/// The core never builds these itself; a loader hands over ready instances.
pub trait Sound {
    fn play(&mut self);
    fn stop(&mut self);
    /// 0.0 - 1.0, callers clamp before passing it in
    fn set_volume(&mut self, volume: f32);
    fn source(&self) -> &str;
}

#[derive(Clone, Debug)]
pub struct TriggerParams {
    pub sample_id: SampleId,
    pub gain: f32,
}

#[derive(Clone, Debug)]
pub enum AudioCommand {
    // The engine can't load files (interrupts thread), so the loader must first
    // register a decoded buffer (see sample_loader.rs), then the sound can refer
    // to it by id
    RegisterSample { id: SampleId, buffer: SampleBuffer },

    // The sound that owned this sample is gone: free the buffer and its voices
    Unregister(SampleId),

    // Restart the sample from the top
    Trigger(TriggerParams),

    // Silence every voice playing this sample
    Stop(SampleId),

    // Change gain of voices already playing this sample
    SetGain { id: SampleId, gain: f32 },
}
