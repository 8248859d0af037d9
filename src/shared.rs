// The event plan between the UI and the core:
//
// Grid:
//   Toggle { row, beat }     //  click on a beat cell
//   AddSound(path)           //  "Add sound" with the path field contents
//                            //  (empty = nothing selected)
//   RemoveSound(row)         //  the remove button on a sound header
//   Clear                    //  turn every cell off, keep the sounds
//   Resize { .. }            //  the config dialog (metre, length, tacts)
//
// Transport:
//   SetBpm(f32), SetVolume(f32)
//   TurnOn, TurnOff, TogglePlay, ResetCursor
//
// Project:
//   LoadProject(path), StoreProject(path)
//
// And back out of the core the UI only ever gets three things (see `middle::EventSink`):
//   draw_sound   - a new row exists, render it
//   refresh_view - geometry or contents changed, redraw the whole grid
//   notify       - a human readable error line for the status bar

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BPM: f32 = 90.0;
pub const DEFAULT_TACT_COUNT: usize = 3;
pub const DEFAULT_VOLUME: f32 = 0.5;
// longest loop the controller accepts, in beats
pub const MAX_LOOP_BEATS: usize = 4096;

// ye olde time signature
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub beats_per_tact: usize, // metre, becomes the beat map's tact length
    pub beat_unit: u32,        // denominator, only affects the tick period
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self { beats_per_tact: 4, beat_unit: 8 }
    }
}

impl TimeSignature {
    pub fn new(beats_per_tact: usize, beat_unit: u32) -> Self {
        Self { beats_per_tact, beat_unit }
    }

    /// Seconds between two ticks: `60 / bpm / (beat_unit / 4)`.
    ///
    /// `None` when the tempo or the unit can't produce a positive finite period.
    pub fn period_secs(&self, bpm: f32) -> Option<f64> {
        if !bpm.is_finite() || bpm <= 0.0 || self.beat_unit == 0 {
            return None;
        }
        Some(60.0 / bpm as f64 / (self.beat_unit as f64 / 4.0))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum UiEvent {
    // grid
    Toggle { row: usize, beat: usize },
    AddSound(String),
    RemoveSound(usize),
    Clear,
    Resize { time_signature: TimeSignature, tact_count: usize },

    // transport
    SetBpm(f32),
    SetVolume(f32), // 0.0 - 1.0
    TurnOn,
    TurnOff,
    TogglePlay,
    ResetCursor,

    // project
    LoadProject(PathBuf),
    StoreProject(PathBuf),
}
