//! Scripted player that drives a headless round.

use std::{collections::BTreeMap, time::Duration};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use reflex_arcade_core::{Event, TargetId};

use crate::config::BotConfig;

/// Click the bot decided to perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BotAction {
    /// Click the identified target.
    Hit(TargetId),
    /// Click the board next to a target.
    MissBoard,
}

#[derive(Clone, Copy, Debug)]
struct Plan {
    due: Duration,
    action: BotAction,
}

/// Watches the event stream and schedules clicks after a jittered reaction time.
#[derive(Debug)]
pub(crate) struct Autoplay {
    config: BotConfig,
    rng: ChaCha8Rng,
    play_time: Duration,
    plans: BTreeMap<TargetId, Plan>,
}

impl Autoplay {
    pub(crate) fn new(config: BotConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            play_time: Duration::ZERO,
            plans: BTreeMap::new(),
        }
    }

    /// Play time the bot has observed since the round started.
    pub(crate) fn play_time(&self) -> Duration {
        self.play_time
    }

    pub(crate) fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    self.play_time = self.play_time.saturating_add(*dt);
                }
                Event::TargetSpawned { target } => {
                    if let Some(action) = self.choose_action(target.id, target.is_penalty) {
                        let due = target.spawned_at.saturating_add(self.reaction());
                        let _ = self.plans.insert(target.id, Plan { due, action });
                    }
                }
                Event::TargetRemoved { target, .. } => {
                    let _ = self.plans.remove(target);
                }
                Event::RoundEnded { .. } => {
                    self.plans.clear();
                    self.play_time = Duration::ZERO;
                }
                _ => {}
            }
        }
    }

    /// Removes and returns every click whose reaction time has elapsed.
    pub(crate) fn due_actions(&mut self) -> Vec<BotAction> {
        let now = self.play_time;
        let due: Vec<TargetId> = self
            .plans
            .iter()
            .filter(|(_, plan)| plan.due <= now)
            .map(|(id, _)| *id)
            .collect();

        due.into_iter()
            .filter_map(|id| self.plans.remove(&id))
            .map(|plan| plan.action)
            .collect()
    }

    fn choose_action(&mut self, target: TargetId, is_penalty: bool) -> Option<BotAction> {
        if is_penalty {
            if self.rng.gen_bool(self.config.discipline) {
                None
            } else {
                Some(BotAction::Hit(target))
            }
        } else if self.rng.gen_bool(self.config.accuracy) {
            Some(BotAction::Hit(target))
        } else if self.rng.gen_bool(0.5) {
            Some(BotAction::MissBoard)
        } else {
            None
        }
    }

    fn reaction(&mut self) -> Duration {
        let base = self.config.reaction_ms as f64;
        let jitter = self.rng.gen_range(0.5..1.5);
        Duration::from_secs_f64(base * jitter / 1_000.0)
    }
}
