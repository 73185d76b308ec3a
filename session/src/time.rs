//! Time sources used to stamp frames and round transitions.

use std::{cell::Cell, rc::Rc, time::Duration, time::Instant};

use reflex_arcade_core::Timestamp;

/// Supplies the current instant to the session.
pub trait TimeSource {
    /// Returns the current instant.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time source measuring from the moment it was created.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicTimeSource {
    origin: Instant,
}

impl MonotonicTimeSource {
    /// Creates a time source whose origin is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::from_offset(self.origin.elapsed())
    }
}

/// Manually advanced time source for tests and headless simulation.
///
/// Clones share the same instant, so a caller can keep a handle after moving
/// one into a session.
#[derive(Clone, Debug, Default)]
pub struct ManualTimeSource {
    now: Rc<Cell<Duration>>,
}

impl ManualTimeSource {
    /// Creates a time source positioned at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the current instant forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get().saturating_add(delta));
    }

    /// Moves the current instant to `at`.
    pub fn set(&self, at: Timestamp) {
        self.now.set(at.offset());
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::from_offset(self.now.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clones_share_the_instant() {
        let source = ManualTimeSource::new();
        let handle = source.clone();
        handle.advance(Duration::from_millis(250));
        assert_eq!(source.now(), Timestamp::from_millis(250));

        source.set(Timestamp::from_millis(40));
        assert_eq!(handle.now(), Timestamp::from_millis(40));
    }

    #[test]
    fn monotonic_source_never_goes_backwards() {
        let source = MonotonicTimeSource::new();
        let first = source.now();
        let second = source.now();
        assert!(second >= first);
    }
}
