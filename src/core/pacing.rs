//=========================================================================
// Frame Pacing
//=========================================================================
//
// Fixed-interval pacing for the game-loop thread.
//
// Each frame sleeps for `target - cost`, clamped at zero. A frame that
// overruns its budget simply starts the next one immediately; there is
// no catch-up.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::thread;
use std::time::{Duration, Instant};

//=== FramePacer ==========================================================

/// Sleeps out the remainder of each frame's budget.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FramePacer {
    target: Duration,
}

impl FramePacer {
    pub(crate) fn new(target: Duration) -> Self {
        Self { target }
    }

    pub(crate) fn target(&self) -> Duration {
        self.target
    }

    /// Time left in the budget after a frame that cost `cost`.
    pub(crate) fn remaining(&self, cost: Duration) -> Duration {
        self.target.saturating_sub(cost)
    }

    /// Sleeps until `frame_start + target`, or not at all if that has passed.
    pub(crate) fn pace(&self, frame_start: Instant) {
        let remaining = self.remaining(frame_start.elapsed());
        if !remaining.is_zero() {
            thread::sleep(remaining);
        }
    }
}

//=== FrameClock ==========================================================

/// Measures the interval between consecutive frame starts.
#[derive(Debug)]
pub(crate) struct FrameClock {
    last_frame: Option<Instant>,
    delta: Duration,
}

impl FrameClock {
    /// Creates a clock that reports `initial` until two frames have started.
    pub(crate) fn new(initial: Duration) -> Self {
        Self {
            last_frame: None,
            delta: initial,
        }
    }

    /// Marks the start of a frame and returns the updated delta.
    pub(crate) fn tick(&mut self, now: Instant) -> Duration {
        if let Some(last) = self.last_frame {
            self.delta = now.saturating_duration_since(last);
        }
        self.last_frame = Some(now);
        self.delta
    }

    #[cfg(test)]
    pub(crate) fn delta(&self) -> Duration {
        self.delta
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: Duration = Duration::from_millis(16);

    #[test]
    fn remaining_is_target_minus_cost() {
        let pacer = FramePacer::new(TARGET);
        assert_eq!(pacer.remaining(Duration::from_millis(4)), Duration::from_millis(12));
        assert_eq!(pacer.remaining(Duration::ZERO), TARGET);
    }

    #[test]
    fn remaining_never_goes_negative() {
        let pacer = FramePacer::new(TARGET);
        assert_eq!(pacer.remaining(TARGET), Duration::ZERO);
        assert_eq!(pacer.remaining(Duration::from_millis(40)), Duration::ZERO);
        assert_eq!(pacer.remaining(Duration::MAX), Duration::ZERO);
    }

    #[test]
    fn overrun_frame_does_not_sleep() {
        let pacer = FramePacer::new(Duration::from_millis(1));
        let start = Instant::now() - Duration::from_millis(50);

        let before = Instant::now();
        pacer.pace(start);

        assert!(before.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn pace_waits_out_the_budget() {
        let pacer = FramePacer::new(Duration::from_millis(5));
        let start = Instant::now();

        pacer.pace(start);

        assert!(start.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn clock_reports_initial_until_second_tick() {
        let mut clock = FrameClock::new(TARGET);
        let start = Instant::now();

        assert_eq!(clock.tick(start), TARGET);
        assert_eq!(clock.tick(start + Duration::from_millis(20)), Duration::from_millis(20));
        assert_eq!(clock.delta(), Duration::from_millis(20));
    }

    #[test]
    fn clock_ignores_backwards_time() {
        let mut clock = FrameClock::new(TARGET);
        let start = Instant::now() + Duration::from_millis(10);

        clock.tick(start);

        assert_eq!(clock.tick(start - Duration::from_millis(5)), Duration::ZERO);
    }
}
