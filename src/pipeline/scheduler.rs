// Single-shot, self re-arming tick loop.
//
// Each tick measures how long the beat work took and arms the next tick for whatever is
// left of the period, so slow beats don't drag the tempo down. An overrun arms for zero:
// the next beat fires as soon as possible and missed time is never caught up in bursts.
// Jitter in when the host timer actually fires is not corrected.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Host timer primitive; fires once per `arm`, arming again replaces the pending shot.
pub trait Timer {
    fn arm(&mut self, delay: Duration);
}

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Single-shot deadline for a hand-rolled event loop. Clones share the deadline, so the
/// scheduler can own one while the loop polls another.
#[derive(Clone, Debug, Default)]
pub struct DeadlineTimer {
    deadline: Rc<Cell<Option<Instant>>>,
}

impl DeadlineTimer {
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline.get()
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.get().map(|d| d.saturating_duration_since(now))
    }

    /// Consume the shot if it is due.
    pub fn take_due(&self, now: Instant) -> bool {
        match self.deadline.get() {
            Some(d) if d <= now => {
                self.deadline.set(None);
                true
            }
            _ => false,
        }
    }
}

impl Timer for DeadlineTimer {
    fn arm(&mut self, delay: Duration) {
        self.deadline.set(Some(Instant::now() + delay));
    }
}

pub struct Scheduler<T: Timer, C: Clock = SystemClock> {
    timer: T,
    clock: C,
    period: Duration,
    armed: bool,
    last_tick_start: Option<Instant>,
}

impl<T: Timer, C: Clock> Scheduler<T, C> {
    pub fn new(timer: T, clock: C, period: Duration) -> Self {
        Self {
            timer,
            clock,
            period,
            armed: false,
            last_tick_start: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn last_tick_start(&self) -> Option<Instant> {
        self.last_tick_start
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    // A shot that's already counting down keeps its delay; the new period applies
    // on the next re-arm.
    pub fn set_period(&mut self, period: Duration) {
        self.period = period;
    }

    /// Arm the loop and run the first tick right away.
    pub fn start(&mut self, on_tick: impl FnOnce()) {
        self.armed = true;
        self.tick(on_tick);
    }

    // Nothing is cancelled: the pending shot still fires, sees `armed == false` and stops the loop.
    pub fn stop(&mut self) {
        self.armed = false;
    }

    /// Run one beat and re-arm. Returns false when the loop is stopped (the only way out).
    pub fn tick(&mut self, on_tick: impl FnOnce()) -> bool {
        if !self.armed {
            log::debug!(target: "qbeat::scheduler", "tick while disarmed, loop ends");
            return false;
        }
        let beat_start = self.clock.now();
        self.last_tick_start = Some(beat_start);

        on_tick();

        let elapsed = self.clock.now().saturating_duration_since(beat_start);
        let delay = self.period.saturating_sub(elapsed);
        if elapsed > self.period {
            log::debug!(
                target: "qbeat::scheduler",
                "beat overran period by {:?}",
                elapsed - self.period
            );
        }
        self.timer.arm(delay);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_fixture::{ManualClock, RecordingTimer};

    fn scheduler(period_ms: u64) -> (Scheduler<RecordingTimer, ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let period = Duration::from_millis(period_ms);
        let s = Scheduler::new(RecordingTimer::default(), clock.clone(), period);
        (s, clock)
    }

    #[test]
    fn start_ticks_immediately_and_rearms() {
        let (mut s, _clock) = scheduler(250);
        let mut ticks = 0;
        s.start(|| ticks += 1);
        assert_eq!(ticks, 1);
        assert!(s.is_armed());
        assert_eq!(s.timer().delays(), vec![Duration::from_millis(250)]);
    }

    #[test]
    fn slow_beats_shorten_the_next_delay() {
        let (mut s, clock) = scheduler(250);
        s.start(|| clock.advance(Duration::from_millis(40)));
        assert_eq!(s.timer().delays(), vec![Duration::from_millis(210)]);
    }

    #[test]
    fn overrun_arms_for_zero() {
        let (mut s, clock) = scheduler(250);
        s.start(|| clock.advance(Duration::from_millis(250)));
        s.tick(|| clock.advance(Duration::from_millis(400)));
        assert_eq!(s.timer().delays(), vec![Duration::ZERO, Duration::ZERO]);
    }

    #[test]
    fn stopped_loop_runs_nothing_and_does_not_rearm() {
        let (mut s, _clock) = scheduler(250);
        let mut ticks = 0;
        s.start(|| ticks += 1);
        s.stop();
        assert!(!s.tick(|| ticks += 1));
        assert_eq!(ticks, 1);
        assert_eq!(s.timer().delays().len(), 1);
    }

    #[test]
    fn period_change_applies_on_next_rearm() {
        let (mut s, _clock) = scheduler(250);
        s.start(|| {});
        s.set_period(Duration::from_millis(500));
        assert_eq!(s.timer().delays(), vec![Duration::from_millis(250)]);
        s.tick(|| {});
        assert_eq!(s.timer().delays()[1], Duration::from_millis(500));
    }

    #[test]
    fn deadline_timer_fires_once() {
        let poll = DeadlineTimer::default();
        let mut armed = poll.clone();
        assert!(!poll.take_due(Instant::now()));

        armed.arm(Duration::ZERO);
        let now = Instant::now();
        assert_eq!(poll.remaining(now), Some(Duration::ZERO));
        assert!(poll.take_due(now));
        assert!(!poll.take_due(now));

        armed.arm(Duration::from_secs(60));
        assert!(!poll.take_due(Instant::now()));
        assert!(poll.remaining(Instant::now()).unwrap() > Duration::from_secs(59));
    }

    #[test]
    fn records_tick_start() {
        let (mut s, clock) = scheduler(100);
        assert!(s.last_tick_start().is_none());
        clock.advance(Duration::from_millis(7));
        s.start(|| {});
        assert_eq!(s.last_tick_start(), Some(clock.now()));
    }
}
