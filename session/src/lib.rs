#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Control surface that hosts a Reflex Arcade round.
//!
//! A [`Session`] owns the authoritative world together with the spawning and
//! expiry systems. Host input (start, pause, reset, difficulty changes,
//! clicks and frame callbacks) becomes commands stamped by a [`TimeSource`].
//! After every command the session feeds the resulting events back into the
//! systems until no further commands are produced, queues the events for the
//! presentation layer, and writes the best-score table whenever a round sets
//! a new record.

mod time;

use std::time::Duration;

use reflex_arcade_core::{
    BestScores, Command, Difficulty, Event, RoundPhase, Surface, TargetId, TargetView,
};
use reflex_arcade_persistence::BestScoreStore;
use reflex_arcade_system_expiry::Expiry;
use reflex_arcade_system_spawning::{Config as SpawningConfig, Spawning};
use reflex_arcade_world::{self as world, query, World};
use tracing::{debug, error, warn};

pub use time::{ManualTimeSource, MonotonicTimeSource, TimeSource};

/// Parameters used to construct a session.
#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    /// Seed for the spawner's random number generator.
    pub seed: u64,
    /// Playing surface targets spawn on.
    pub surface: Surface,
    /// Difficulty selected when the session opens.
    pub difficulty: Difficulty,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed_0fa4_c4de,
            surface: Surface::default(),
            difficulty: Difficulty::default(),
        }
    }
}

/// Read-only summary of the round for heads-up displays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundSnapshot {
    /// Phase the round is in.
    pub phase: RoundPhase,
    /// Selected difficulty.
    pub difficulty: Difficulty,
    /// Current score.
    pub score: u32,
    /// Current streak.
    pub streak: u32,
    /// Time left in the round.
    pub time_left: Duration,
    /// Whole seconds left, rounded up.
    pub display_seconds: u64,
    /// Best score recorded for the selected difficulty.
    pub best: u32,
    /// Number of targets currently live.
    pub live_targets: usize,
}

/// Hosts a round and exposes the commands a user interface may issue.
#[derive(Debug)]
pub struct Session<T, S> {
    world: World,
    spawning: Spawning,
    expiry: Expiry,
    time: T,
    store: S,
    outbox: Vec<Event>,
}

impl<T: TimeSource, S: BestScoreStore> Session<T, S> {
    /// Opens a session, loading best scores from `store`.
    ///
    /// An unreadable or corrupt record is treated as absent.
    pub fn new(config: SessionConfig, time: T, store: S) -> Self {
        let best = match store.load() {
            Ok(best) => best,
            Err(error) => {
                warn!(%error, "ignoring unreadable best-score record");
                BestScores::default()
            }
        };

        let mut session = Self {
            world: World::with_best_scores(best),
            spawning: Spawning::new(SpawningConfig::new(config.seed)),
            expiry: Expiry::new(),
            time,
            store,
            outbox: Vec::new(),
        };
        session.submit(Command::ConfigureSurface {
            surface: config.surface,
        });
        session.submit(Command::SelectDifficulty {
            difficulty: config.difficulty,
        });
        session.submit(Command::ResetRound);
        session
    }

    /// Starts a round unless one is already running.
    pub fn start(&mut self) {
        let at = self.time.now();
        self.submit(Command::StartRound { at });
    }

    /// Pauses an active round or resumes a paused one.
    pub fn toggle_pause(&mut self) {
        match query::phase(&self.world) {
            RoundPhase::Active => self.submit(Command::PauseRound),
            RoundPhase::Paused => {
                let at = self.time.now();
                self.submit(Command::ResumeRound { at });
            }
            RoundPhase::Idle | RoundPhase::Ended => {}
        }
    }

    /// Starts a round when none is running, otherwise toggles pause.
    pub fn primary_action(&mut self) {
        if query::phase(&self.world).is_running() {
            self.toggle_pause();
        } else {
            self.start();
        }
    }

    /// Discards the current round and returns to idle.
    pub fn reset(&mut self) {
        self.submit(Command::ResetRound);
    }

    /// Selects the difficulty named by `key`; unknown keys select medium.
    ///
    /// Ignored while a round is running.
    pub fn set_difficulty(&mut self, key: &str) {
        self.submit(Command::SelectDifficulty {
            difficulty: Difficulty::from_key(key),
        });
    }

    /// Reports a click on the target identified by `target`.
    pub fn hit_target(&mut self, target: TargetId) {
        self.submit(Command::HitTarget { target });
    }

    /// Reports a click that landed on the surface but missed every target.
    pub fn miss_board(&mut self) {
        self.submit(Command::MissBoard);
    }

    /// Replaces the playing surface dimensions.
    pub fn resize(&mut self, surface: Surface) {
        self.submit(Command::ConfigureSurface { surface });
    }

    /// Advances the round to the current instant; call once per rendered frame.
    pub fn frame(&mut self) {
        let at = self.time.now();
        self.submit(Command::Frame { at });
    }

    /// Submits a raw command and runs the systems until they settle.
    pub fn submit(&mut self, command: Command) {
        let mut pending = vec![command];

        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }

            if events.is_empty() {
                break;
            }

            let phase = query::phase(&self.world);
            self.spawning.handle(
                &events,
                phase,
                query::profile(&self.world),
                query::surface(&self.world),
                &mut pending,
            );
            self.expiry.handle(
                &events,
                phase,
                &query::target_view(&self.world),
                query::round_time(&self.world),
                &mut pending,
            );
            self.persist_records(&events);
            self.outbox.extend(events);
        }
    }

    fn persist_records(&mut self, events: &[Event]) {
        for event in events {
            if let Event::RoundEnded {
                difficulty,
                best,
                new_best: true,
                ..
            } = event
            {
                debug!(%difficulty, best, "persisting new best score");
                let table = query::best_scores(&self.world);
                if let Err(error) = self.store.save(&table) {
                    error!(%error, "failed to persist best scores");
                }
            }
        }
    }

    /// Removes and returns every event produced since the previous drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.outbox)
    }

    /// Summarises the round for display.
    #[must_use]
    pub fn snapshot(&self) -> RoundSnapshot {
        let difficulty = query::difficulty(&self.world);
        RoundSnapshot {
            phase: query::phase(&self.world),
            difficulty,
            score: query::score(&self.world),
            streak: query::streak(&self.world),
            time_left: query::time_left(&self.world),
            display_seconds: query::display_seconds(&self.world),
            best: query::best_scores(&self.world).get(difficulty),
            live_targets: query::target_view(&self.world).len(),
        }
    }

    /// Captures the live targets for rendering.
    #[must_use]
    pub fn targets(&self) -> TargetView {
        query::target_view(&self.world)
    }

    /// Best scores known to the session.
    #[must_use]
    pub fn best_scores(&self) -> BestScores {
        query::best_scores(&self.world)
    }

    /// Read-only access to the backing best-score store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}
