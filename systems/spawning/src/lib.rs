#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting target spawn commands.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use reflex_arcade_core::{
    Command, DifficultyProfile, Event, RoundPhase, StatusMessage, Surface, SurfacePoint,
};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided random seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that emits spawn commands while a round is active.
///
/// Spawn cadence is measured in play time: the system accumulates
/// `Event::TimeAdvanced` durations and releases one spawn per whole
/// `spawn_interval`. Outside the active phase the accumulator is discarded,
/// so a resumed round waits a full interval before its next spawn.
#[derive(Debug)]
pub struct Spawning {
    accumulator: Duration,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and immutable views to emit spawn commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: RoundPhase,
        profile: DifficultyProfile,
        surface: Surface,
        out: &mut Vec<Command>,
    ) {
        if phase != RoundPhase::Active {
            self.accumulator = Duration::ZERO;
            return;
        }

        let interval = profile.spawn_interval();
        if interval.is_zero() {
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::StatusChanged {
                    phase: RoundPhase::Active,
                    message,
                } if restarts_cadence(*message) => {
                    self.accumulator = Duration::ZERO;
                    accumulated = Duration::ZERO;
                }
                Event::TimeAdvanced { dt } => {
                    accumulated = accumulated.saturating_add(*dt);
                }
                _ => {}
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        let spawn_attempts = self.resolve_spawn_attempts(interval);

        for _ in 0..spawn_attempts {
            let position = self.select_position(surface);
            let is_penalty = self.roll_penalty(profile.penalty_chance());
            out.push(Command::SpawnTarget {
                position,
                is_penalty,
                lifetime: profile.lifetime(),
            });
        }
    }

    fn resolve_spawn_attempts(&mut self, interval: Duration) -> usize {
        if interval.is_zero() {
            return 0;
        }

        let mut attempts = 0;
        while self.accumulator >= interval {
            self.accumulator -= interval;
            attempts += 1;
        }
        attempts
    }

    fn select_position(&mut self, surface: Surface) -> SurfacePoint {
        let (min_x, max_x) = surface.spawn_range_x();
        let (min_y, max_y) = surface.spawn_range_y();
        SurfacePoint::new(
            self.rng.gen_range(min_x..=max_x),
            self.rng.gen_range(min_y..=max_y),
        )
    }

    fn roll_penalty(&mut self, penalty_chance: f64) -> bool {
        self.rng.gen::<f64>() < penalty_chance
    }
}

fn restarts_cadence(message: StatusMessage) -> bool {
    matches!(message, StatusMessage::GameOn | StatusMessage::Resumed)
}
