//! Playback controller - ties the beat map to the scheduler
//!
//! Owns the sounds (one per beat map row, same order), plays whatever fires at the cursor
//! on every tick and moves the cursor on. Everything here runs on one thread; the
//! scheduler only re-arms after a beat has finished, so ticks never overlap.

use std::time::Duration;

use crate::audio_api::Sound;
use crate::config::SequencerConfig;
use crate::loader::admission::Install;
use crate::shared::{MAX_LOOP_BEATS, TimeSignature};

use super::SequencerError;
use super::beat_map::BeatMap;
use super::scheduler::{Clock, Scheduler, SystemClock, Timer};

pub struct PlaybackController<S: Sound, T: Timer, C: Clock = SystemClock> {
    beat_map: BeatMap,
    sounds: Vec<S>,
    scheduler: Scheduler<T, C>,
    bpm: f32,
    time_signature: TimeSignature,
    volume: f32,
}

impl<S: Sound, T: Timer, C: Clock> PlaybackController<S, T, C> {
    pub fn new(timer: T, clock: C, config: &SequencerConfig) -> Result<Self, SequencerError> {
        let period = period_for(config.bpm, config.time_signature)?;
        check_geometry(config.time_signature.beats_per_tact, config.tact_count)?;
        Ok(Self {
            beat_map: BeatMap::new(config.time_signature.beats_per_tact, config.tact_count),
            sounds: Vec::new(),
            scheduler: Scheduler::new(timer, clock, period),
            bpm: config.bpm,
            time_signature: config.time_signature,
            volume: config.volume.clamp(0.0, 1.0),
        })
    }

    pub fn beat_map(&self) -> &BeatMap {
        &self.beat_map
    }

    pub fn scheduler(&self) -> &Scheduler<T, C> {
        &self.scheduler
    }

    pub fn sounds(&self) -> &[S] {
        &self.sounds
    }

    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    pub fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }

    pub fn tact_count(&self) -> usize {
        self.beat_map.tact_count()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn period(&self) -> Duration {
        self.scheduler.period()
    }

    pub fn is_on(&self) -> bool {
        self.scheduler.is_armed()
    }

    pub fn settings(&self) -> SequencerConfig {
        SequencerConfig {
            bpm: self.bpm,
            time_signature: self.time_signature,
            tact_count: self.beat_map.tact_count(),
            volume: self.volume,
        }
    }

    pub fn sources(&self) -> Vec<String> {
        self.sounds.iter().map(|s| s.source().to_string()).collect()
    }

    pub fn snapshot(&self) -> Vec<Vec<bool>> {
        self.beat_map.snapshot()
    }

    /// Timer callback: one beat, then re-arm.
    pub fn tick(&mut self) -> bool {
        let Self { scheduler, beat_map, sounds, .. } = self;
        scheduler.tick(|| play_beat(beat_map, sounds))
    }

    pub fn turn_on(&mut self) {
        let Self { scheduler, beat_map, sounds, .. } = self;
        log::info!(target: "qbeat::playback", "playback on at beat {}", beat_map.cursor());
        scheduler.start(|| play_beat(beat_map, sounds));
    }

    pub fn turn_off(&mut self) {
        log::info!(target: "qbeat::playback", "playback off");
        self.scheduler.stop();
    }

    pub fn toggle_on(&mut self) {
        if self.is_on() {
            self.turn_off();
        } else {
            self.turn_on();
        }
    }

    pub fn reset_cursor(&mut self) {
        self.beat_map.reset_cursor();
    }

    pub fn set_bpm(&mut self, bpm: f32) -> Result<(), SequencerError> {
        let period = period_for(bpm, self.time_signature)?;
        self.bpm = bpm;
        self.scheduler.set_period(period);
        Ok(())
    }

    // Metre is the beat map's tact length, so a new signature wipes the pattern like any resize.
    pub fn set_time_signature(
        &mut self,
        time_signature: TimeSignature,
    ) -> Result<(), SequencerError> {
        self.resize(time_signature, self.beat_map.tact_count())
    }

    pub fn resize(
        &mut self,
        time_signature: TimeSignature,
        tact_count: usize,
    ) -> Result<(), SequencerError> {
        let period = period_for(self.bpm, time_signature)?;
        check_geometry(time_signature.beats_per_tact, tact_count)?;
        self.time_signature = time_signature;
        self.beat_map.resize(time_signature.beats_per_tact, tact_count);
        self.scheduler.set_period(period);
        log::debug!(
            target: "qbeat::playback",
            "resized to {}/{} x {} tacts, period {:?}",
            time_signature.beats_per_tact, time_signature.beat_unit, tact_count, period
        );
        Ok(())
    }

    pub fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 0.0 };
        for sound in &mut self.sounds {
            sound.set_volume(volume);
        }
        self.volume = volume;
    }

    pub fn toggle(&mut self, row: usize, beat: usize) {
        self.beat_map.toggle(row, beat);
    }

    pub fn clear(&mut self) {
        self.beat_map.clear();
    }

    pub fn remove_sound(&mut self, row: usize) -> bool {
        if !self.beat_map.remove(row) {
            return false;
        }
        let mut sound = self.sounds.remove(row);
        sound.stop();
        log::debug!(target: "qbeat::playback", "removed row {} ({})", row, sound.source());
        true
    }

    pub fn remove_all_sounds(&mut self) {
        while self.remove_sound(0) {}
    }
}

impl<S: Sound, T: Timer, C: Clock> Install<S> for PlaybackController<S, T, C> {
    fn install(&mut self, mut sound: S, seed: Option<&[bool]>) -> (usize, &S) {
        sound.set_volume(self.volume);
        let row = self.beat_map.append(seed);
        self.sounds.push(sound);
        (row, &self.sounds[row])
    }
}

fn play_beat<S: Sound>(beat_map: &mut BeatMap, sounds: &mut [S]) {
    for row in beat_map.query(beat_map.cursor()) {
        if let Some(sound) = sounds.get_mut(row) {
            sound.play();
        }
    }
    beat_map.advance_cursor();
}

fn period_for(bpm: f32, time_signature: TimeSignature) -> Result<Duration, SequencerError> {
    if time_signature.beat_unit == 0 {
        return Err(SequencerError::InvalidTimeSignature { beat_unit: 0 });
    }
    // a period too long for Duration or too short to measure can't drive the timer
    time_signature
        .period_secs(bpm)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .filter(|period| !period.is_zero())
        .ok_or(SequencerError::InvalidTempo(bpm))
}

fn check_geometry(tact_length: usize, tact_count: usize) -> Result<(), SequencerError> {
    match tact_length.checked_mul(tact_count) {
        Some(beats) if (1..=MAX_LOOP_BEATS).contains(&beats) => Ok(()),
        _ => Err(SequencerError::InvalidGeometry { tact_length, tact_count }),
    }
}
