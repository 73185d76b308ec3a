//! Score and streak bookkeeping for a single round.

use reflex_arcade_core::{
    BestScores, Difficulty, Reconciliation, HIT_POINTS, PENALTY_POINTS, STREAK_BONUS, STREAK_STEP,
};

/// Score and streak accumulated during the current round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreRecord {
    score: u32,
    streak: u32,
}

/// Effect of a single hit on the score record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    /// A scoring target was hit.
    Scored {
        /// Total points awarded, including the bonus.
        points: u32,
        /// Streak bonus included in `points`.
        bonus: u32,
    },
    /// A penalty target was hit.
    Penalised {
        /// Points actually removed after clamping at zero.
        deducted: u32,
    },
}

impl ScoreRecord {
    /// Score accumulated so far.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Number of consecutive non-penalty hits.
    #[must_use]
    pub const fn streak(&self) -> u32 {
        self.streak
    }

    /// Applies a hit on a penalty or scoring target.
    pub fn apply_hit(&mut self, is_penalty: bool) -> HitOutcome {
        if is_penalty {
            let before = self.score;
            self.score = self.score.saturating_sub(PENALTY_POINTS);
            self.streak = 0;
            return HitOutcome::Penalised {
                deducted: before - self.score,
            };
        }

        self.streak = self.streak.saturating_add(1);
        let bonus = (self.streak / STREAK_STEP).saturating_mul(STREAK_BONUS);
        let points = HIT_POINTS.saturating_add(bonus);
        self.score = self.score.saturating_add(points);
        HitOutcome::Scored { points, bonus }
    }

    /// Applies an expired scoring target, breaking the streak.
    pub fn apply_miss(&mut self) {
        self.streak = 0;
    }

    /// Records the current score into `best` if it beats the stored value.
    pub fn reconcile_best(&self, best: &mut BestScores, difficulty: Difficulty) -> Reconciliation {
        best.reconcile(difficulty, self.score)
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}
