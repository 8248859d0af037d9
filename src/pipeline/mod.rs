pub mod beat_map;
pub mod persistence;
pub mod playback;
pub mod project;
pub mod scheduler;

#[cfg(test)]
pub mod test_fixture;

/// Rejected controller input. The beat map itself never errors; these guard the tempo
/// and geometry values that would make the tick period or the loop length meaningless.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SequencerError {
    #[error("invalid tempo: {0} bpm")]
    InvalidTempo(f32),

    #[error("invalid time signature: beat unit {beat_unit}")]
    InvalidTimeSignature { beat_unit: u32 },

    #[error("invalid loop size: {tact_length} beats x {tact_count} tacts")]
    InvalidGeometry { tact_length: usize, tact_count: usize },
}
