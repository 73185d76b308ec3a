#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative round state management for Reflex Arcade.
//!
//! The world owns the round phase, score record, countdown and live targets.
//! Every mutation arrives as a [`Command`] through [`apply`], which enforces
//! the round state machine (idle, active, paused, ended) and reports the
//! consequences as [`Event`] values.

mod clock;
mod score;
mod targets;

use reflex_arcade_core::{
    BestScores, Command, Difficulty, Event, RemovalCause, RoundPhase, StatusMessage, Surface,
    SurfacePoint, TargetId, Timestamp,
};
use std::time::Duration;
use tracing::{debug, trace};

pub use clock::{ClockTick, RoundClock};
pub use score::{HitOutcome, ScoreRecord};
pub use targets::{ExpiryResolution, HitResolution, TargetRegistry};

/// Represents the authoritative Reflex Arcade state.
#[derive(Debug)]
pub struct World {
    surface: Surface,
    difficulty: Difficulty,
    phase: RoundPhase,
    score: ScoreRecord,
    best: BestScores,
    clock: RoundClock,
    targets: TargetRegistry,
}

impl World {
    /// Creates an idle world with an empty best-score table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_best_scores(BestScores::default())
    }

    /// Creates an idle world seeded with previously persisted best scores.
    #[must_use]
    pub fn with_best_scores(best: BestScores) -> Self {
        Self {
            surface: Surface::default(),
            difficulty: Difficulty::default(),
            phase: RoundPhase::Idle,
            score: ScoreRecord::default(),
            best,
            clock: RoundClock::default(),
            targets: TargetRegistry::new(),
        }
    }

    fn clear_round(&mut self, out_events: &mut Vec<Event>) {
        for target in self.targets.clear_all() {
            out_events.push(Event::TargetRemoved {
                target,
                cause: RemovalCause::Cleared,
            });
        }
        self.score.clear();
        self.clock.reset();
        out_events.push(self.score_event());
        out_events.push(Event::TimeChanged {
            time_left: self.clock.time_left(),
        });
    }

    fn end_round(&mut self, out_events: &mut Vec<Event>) {
        self.phase = RoundPhase::Ended;
        self.clock.suspend();
        for target in self.targets.clear_all() {
            out_events.push(Event::TargetRemoved {
                target,
                cause: RemovalCause::Cleared,
            });
        }

        let reconciliation = self.score.reconcile_best(&mut self.best, self.difficulty);
        if reconciliation.updated {
            out_events.push(Event::BestScoreChanged {
                difficulty: self.difficulty,
                best: reconciliation.best,
            });
        }

        debug!(
            difficulty = %self.difficulty,
            score = self.score.score(),
            best = reconciliation.best,
            new_best = reconciliation.updated,
            "round ended"
        );
        out_events.push(Event::RoundEnded {
            difficulty: self.difficulty,
            score: self.score.score(),
            streak: self.score.streak(),
            best: reconciliation.best,
            new_best: reconciliation.updated,
        });
        self.push_status(
            StatusMessage::TimeUp {
                score: self.score.score(),
                streak: self.score.streak(),
            },
            out_events,
        );
    }

    fn score_event(&self) -> Event {
        Event::ScoreChanged {
            score: self.score.score(),
            streak: self.score.streak(),
        }
    }

    fn push_status(&self, message: StatusMessage, out_events: &mut Vec<Event>) {
        out_events.push(Event::StatusChanged {
            phase: self.phase,
            message,
        });
    }

    fn start(&mut self, at: Timestamp, out_events: &mut Vec<Event>) {
        if self.phase.is_running() {
            ignored("StartRound", self.phase);
            return;
        }

        self.clear_round(out_events);
        self.phase = RoundPhase::Active;
        self.clock.start(at);
        debug!(difficulty = %self.difficulty, "round started");
        self.push_status(StatusMessage::GameOn, out_events);
    }

    fn pause(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != RoundPhase::Active {
            ignored("PauseRound", self.phase);
            return;
        }

        self.phase = RoundPhase::Paused;
        self.clock.suspend();
        debug!(time_left = ?self.clock.time_left(), "round paused");
        self.push_status(StatusMessage::Paused, out_events);
    }

    fn resume(&mut self, at: Timestamp, out_events: &mut Vec<Event>) {
        if self.phase != RoundPhase::Paused {
            ignored("ResumeRound", self.phase);
            return;
        }

        self.phase = RoundPhase::Active;
        self.clock.resume(at);
        debug!(time_left = ?self.clock.time_left(), "round resumed");
        self.push_status(StatusMessage::Resumed, out_events);
    }

    fn reset(&mut self, out_events: &mut Vec<Event>) {
        self.clear_round(out_events);
        self.phase = RoundPhase::Idle;
        debug!("round reset");
        self.push_status(StatusMessage::Welcome, out_events);
    }

    fn frame(&mut self, at: Timestamp, out_events: &mut Vec<Event>) {
        if self.phase != RoundPhase::Active {
            return;
        }

        let Some(tick) = self.clock.advance(at) else {
            return;
        };

        out_events.push(Event::TimeAdvanced { dt: tick.dt });
        out_events.push(Event::TimeChanged {
            time_left: self.clock.time_left(),
        });

        if tick.expired {
            self.end_round(out_events);
        }
    }

    fn select_difficulty(&mut self, difficulty: Difficulty, out_events: &mut Vec<Event>) {
        if !self.phase.allows_difficulty_change() {
            ignored("SelectDifficulty", self.phase);
            return;
        }

        self.difficulty = difficulty;
        out_events.push(Event::DifficultyChanged { difficulty });
        out_events.push(Event::BestScoreChanged {
            difficulty,
            best: self.best.get(difficulty),
        });
    }

    fn spawn_target(
        &mut self,
        position: SurfacePoint,
        is_penalty: bool,
        lifetime: Duration,
        out_events: &mut Vec<Event>,
    ) {
        if self.phase != RoundPhase::Active {
            ignored("SpawnTarget", self.phase);
            return;
        }

        let Some(target) = self
            .targets
            .spawn(position, is_penalty, lifetime, self.clock.elapsed())
        else {
            debug!("target identifiers exhausted, spawn dropped");
            return;
        };
        out_events.push(Event::TargetSpawned { target });
    }

    fn hit_target(&mut self, target: TargetId, out_events: &mut Vec<Event>) {
        if self.phase != RoundPhase::Active {
            ignored("HitTarget", self.phase);
            return;
        }

        let Some(resolution) = self.targets.hit(target, &mut self.score) else {
            trace!(%target, "hit on a target that is no longer live");
            return;
        };

        out_events.push(Event::TargetRemoved {
            target,
            cause: RemovalCause::Hit,
        });
        out_events.push(self.score_event());
        let message = match resolution.outcome {
            HitOutcome::Scored { bonus, .. } => StatusMessage::Hit {
                streak: self.score.streak(),
                bonus,
            },
            HitOutcome::Penalised { .. } => StatusMessage::PenaltyHit,
        };
        self.push_status(message, out_events);
    }

    fn expire_target(&mut self, target: TargetId, out_events: &mut Vec<Event>) {
        if self.phase != RoundPhase::Active {
            ignored("ExpireTarget", self.phase);
            return;
        }

        let now = self.clock.elapsed();
        let Some(resolution) = self.targets.expire(target, now, &mut self.score) else {
            trace!(%target, "expiry for a target that is not due or no longer live");
            return;
        };

        out_events.push(Event::TargetRemoved {
            target,
            cause: RemovalCause::Expired,
        });
        if resolution.missed {
            out_events.push(self.score_event());
            self.push_status(StatusMessage::Missed, out_events);
        }
    }

    fn miss_board(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != RoundPhase::Active {
            ignored("MissBoard", self.phase);
            return;
        }

        self.push_status(StatusMessage::BoardMiss, out_events);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn ignored(command: &'static str, phase: RoundPhase) {
    trace!(command, ?phase, "command ignored in current phase");
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureSurface { surface } => {
            world.surface = surface;
        }
        Command::SelectDifficulty { difficulty } => {
            world.select_difficulty(difficulty, out_events);
        }
        Command::StartRound { at } => world.start(at, out_events),
        Command::PauseRound => world.pause(out_events),
        Command::ResumeRound { at } => world.resume(at, out_events),
        Command::ResetRound => world.reset(out_events),
        Command::Frame { at } => world.frame(at, out_events),
        Command::SpawnTarget {
            position,
            is_penalty,
            lifetime,
        } => world.spawn_target(position, is_penalty, lifetime, out_events),
        Command::HitTarget { target } => world.hit_target(target, out_events),
        Command::MissBoard => world.miss_board(out_events),
        Command::ExpireTarget { target } => world.expire_target(target, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use reflex_arcade_core::{
        BestScores, Difficulty, DifficultyProfile, RoundPhase, Surface, TargetSnapshot, TargetId,
        TargetView,
    };

    /// Phase the current round is in.
    #[must_use]
    pub fn phase(world: &World) -> RoundPhase {
        world.phase
    }

    /// Difficulty selected for the current or next round.
    #[must_use]
    pub fn difficulty(world: &World) -> Difficulty {
        world.difficulty
    }

    /// Timing profile of the selected difficulty.
    #[must_use]
    pub fn profile(world: &World) -> DifficultyProfile {
        world.difficulty.profile()
    }

    /// Dimensions of the playing surface.
    #[must_use]
    pub fn surface(world: &World) -> Surface {
        world.surface
    }

    /// Score accumulated in the current round.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score.score()
    }

    /// Current streak of consecutive non-penalty hits.
    #[must_use]
    pub fn streak(world: &World) -> u32 {
        world.score.streak()
    }

    /// Time left before the round ends.
    #[must_use]
    pub fn time_left(world: &World) -> Duration {
        world.clock.time_left()
    }

    /// Whole seconds left, rounded up for display.
    #[must_use]
    pub fn display_seconds(world: &World) -> u64 {
        world.clock.display_seconds()
    }

    /// Play time accrued since the round started; targets age against it.
    #[must_use]
    pub fn round_time(world: &World) -> Duration {
        world.clock.elapsed()
    }

    /// Best scores recorded for every difficulty.
    #[must_use]
    pub fn best_scores(world: &World) -> BestScores {
        world.best
    }

    /// Looks up a live target.
    #[must_use]
    pub fn target(world: &World, id: TargetId) -> Option<TargetSnapshot> {
        world.targets.get(id).copied()
    }

    /// Captures a read-only view of the live targets.
    #[must_use]
    pub fn target_view(world: &World) -> TargetView {
        world.targets.view()
    }
}
