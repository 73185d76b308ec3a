//! Countdown that drives the round from frame timestamps.

use std::time::Duration;

use reflex_arcade_core::{Timestamp, ROUND_DURATION};

/// Countdown measuring the play time left in the round.
///
/// The clock only accrues time while it holds an anchor. Suspending drops the
/// anchor so that the gap until the next [`RoundClock::resume`] is never
/// counted, regardless of how many frames arrive in between.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundClock {
    duration: Duration,
    time_left: Duration,
    elapsed: Duration,
    anchor: Option<Timestamp>,
    expiry_signalled: bool,
}

/// Outcome of advancing the clock to a frame timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockTick {
    /// Play time that elapsed since the previous frame.
    pub dt: Duration,
    /// Whether this tick ran the clock out. Reported at most once per round.
    pub expired: bool,
}

impl RoundClock {
    /// Creates a stopped clock holding the full round duration.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            time_left: duration,
            elapsed: Duration::ZERO,
            anchor: None,
            expiry_signalled: false,
        }
    }

    /// Time left before the round ends.
    #[must_use]
    pub const fn time_left(&self) -> Duration {
        self.time_left
    }

    /// Play time accrued since the round started.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Whole seconds shown to the player, rounded up.
    #[must_use]
    pub fn display_seconds(&self) -> u64 {
        let secs = self.time_left.as_secs();
        if self.time_left.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }

    /// Restores the full duration and stops the clock.
    pub fn reset(&mut self) {
        *self = Self::new(self.duration);
    }

    /// Starts counting from `at`.
    pub fn start(&mut self, at: Timestamp) {
        self.anchor = Some(at);
    }

    /// Stops accruing time until the next resume.
    pub fn suspend(&mut self) {
        self.anchor = None;
    }

    /// Re-anchors the clock at `at` so suspended time is skipped.
    pub fn resume(&mut self, at: Timestamp) {
        self.anchor = Some(at);
    }

    /// Advances the countdown by the time elapsed since the previous frame.
    ///
    /// Returns `None` while the clock is suspended. Frames stamped earlier
    /// than the anchor count as zero elapsed time.
    pub fn advance(&mut self, at: Timestamp) -> Option<ClockTick> {
        let anchor = self.anchor?;
        let dt = at.saturating_duration_since(anchor);
        self.anchor = Some(at.max(anchor));
        self.time_left = self.time_left.saturating_sub(dt);
        self.elapsed = self.elapsed.saturating_add(dt);

        let expired = self.time_left.is_zero() && !self.expiry_signalled;
        if expired {
            self.expiry_signalled = true;
        }
        Some(ClockTick { dt, expired })
    }
}

impl Default for RoundClock {
    fn default() -> Self {
        Self::new(ROUND_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suspended_clock_ignores_frames() {
        let mut clock = RoundClock::default();
        assert_eq!(clock.advance(Timestamp::from_millis(500)), None);
        assert_eq!(clock.time_left(), ROUND_DURATION);
    }

    #[test]
    fn variable_frame_gaps_are_subtracted() {
        let mut clock = RoundClock::default();
        clock.start(Timestamp::ORIGIN);

        let first = clock.advance(Timestamp::from_millis(16)).expect("ticking");
        let second = clock.advance(Timestamp::from_millis(66)).expect("ticking");

        assert_eq!(first.dt, Duration::from_millis(16));
        assert_eq!(second.dt, Duration::from_millis(50));
        assert_eq!(clock.time_left(), ROUND_DURATION - Duration::from_millis(66));
        assert_eq!(clock.elapsed(), Duration::from_millis(66));
    }

    #[test]
    fn resume_skips_suspended_time() {
        let mut clock = RoundClock::default();
        clock.start(Timestamp::ORIGIN);
        let _ = clock.advance(Timestamp::from_millis(1_000));
        clock.suspend();

        assert_eq!(clock.advance(Timestamp::from_millis(60_000)), None);
        clock.resume(Timestamp::from_millis(60_000));
        let tick = clock.advance(Timestamp::from_millis(60_100)).expect("ticking");

        assert_eq!(tick.dt, Duration::from_millis(100));
        assert_eq!(clock.time_left(), ROUND_DURATION - Duration::from_millis(1_100));
    }

    #[test]
    fn expiry_is_signalled_once_and_clamps_to_zero() {
        let mut clock = RoundClock::new(Duration::from_secs(1));
        clock.start(Timestamp::ORIGIN);

        let tick = clock.advance(Timestamp::from_millis(1_500)).expect("ticking");
        assert!(tick.expired);
        assert_eq!(clock.time_left(), Duration::ZERO);

        let again = clock.advance(Timestamp::from_millis(1_600)).expect("ticking");
        assert!(!again.expired);
        assert_eq!(clock.time_left(), Duration::ZERO);
    }

    #[test]
    fn backwards_frames_count_as_zero() {
        let mut clock = RoundClock::default();
        clock.start(Timestamp::from_millis(500));
        let tick = clock.advance(Timestamp::from_millis(400)).expect("ticking");
        assert_eq!(tick.dt, Duration::ZERO);
        let next = clock.advance(Timestamp::from_millis(520)).expect("ticking");
        assert_eq!(next.dt, Duration::from_millis(20));
    }

    #[test]
    fn display_rounds_partial_seconds_up() {
        let mut clock = RoundClock::default();
        clock.start(Timestamp::ORIGIN);
        let _ = clock.advance(Timestamp::from_millis(100));
        assert_eq!(clock.display_seconds(), 30);
        let _ = clock.advance(Timestamp::from_millis(1_000));
        assert_eq!(clock.display_seconds(), 29);
    }
}
