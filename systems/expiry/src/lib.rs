#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Expiry system that schedules the removal of targets whose lifetime elapsed.
//!
//! Every live target owns a fire-once expiry timer measured in round time.
//! The system fires each timer by emitting a single `Command::ExpireTarget`
//! and cancels it when the world reports the target removed. Cancellation is
//! best-effort: a request that races a hit is rejected by the world because
//! the target is no longer live.

use std::{collections::BTreeSet, time::Duration};

use reflex_arcade_core::{Command, Event, RoundPhase, TargetId, TargetView};

/// Pure system that converts elapsed target lifetimes into expiry commands.
#[derive(Debug, Default)]
pub struct Expiry {
    fired: BTreeSet<TargetId>,
}

impl Expiry {
    /// Creates a new expiry system with no fired timers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers that fired and still await their removal event.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.fired.len()
    }

    /// Consumes world events and the live target view to emit expiry commands.
    ///
    /// Timers only fire after a `TimeAdvanced` event observed while the round
    /// is active, which keeps targets frozen while the round is paused.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: RoundPhase,
        targets: &TargetView,
        round_time: Duration,
        out: &mut Vec<Command>,
    ) {
        let mut tick_observed = false;
        for event in events {
            match event {
                Event::TargetRemoved { target, .. } => {
                    let _ = self.fired.remove(target);
                }
                Event::TimeAdvanced { .. } => tick_observed = true,
                _ => {}
            }
        }

        if !phase.is_running() {
            self.fired.clear();
            return;
        }

        if phase != RoundPhase::Active || !tick_observed {
            return;
        }

        for target in targets.iter() {
            if target.is_expired_at(round_time) && self.fired.insert(target.id) {
                out.push(Command::ExpireTarget { target: target.id });
            }
        }
    }
}
