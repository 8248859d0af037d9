use std::collections::HashMap;

use crate::audio_api::{AudioCommand, TriggerParams};

use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::sample_id::SampleId;
use super::voice::Voice;

const MAX_VOICES: usize = 32; // hard cap so a dense grid can't grow the mix without bound

pub struct Engine {
    samples: HashMap<SampleId, SampleBuffer>,
    voices: Vec<Voice>,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            samples: HashMap::new(),
            voices: Vec::with_capacity(MAX_VOICES),
        }
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn registered_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::RegisterSample { id, buffer } => {
                self.samples.insert(id, buffer);
            }
            AudioCommand::Unregister(id) => {
                self.voices.retain(|v| v.sample_id != id);
                self.samples.remove(&id);
            }
            AudioCommand::Trigger(t) => self.trigger_voice(t),
            AudioCommand::Stop(id) => self.voices.retain(|v| v.sample_id != id),
            AudioCommand::SetGain { id, gain } => {
                for v in self.voices.iter_mut().filter(|v| v.sample_id == id) {
                    v.gain = gain;
                }
            }
        }
    }

    // playing a sample again restarts it, same as a one-shot pad
    fn trigger_voice(&mut self, t: TriggerParams) {
        if !self.samples.contains_key(&t.sample_id) {
            return;
        }
        self.voices.retain(|v| v.sample_id != t.sample_id);
        if self.voices.len() >= MAX_VOICES {
            self.voices.remove(0); // steal the oldest
        }
        self.voices.push(Voice::new(t.sample_id, t.gain));
    }

    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        out.fill(StereoFrame::zero());
        let samples = &self.samples;
        for v in &mut self.voices {
            match samples.get(&v.sample_id) {
                Some(buffer) => v.render_into(buffer, out),
                None => v.active = false,
            }
        }
        self.voices.retain(|v| v.active);
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
