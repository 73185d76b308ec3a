//! Lifecycle of the targets currently live on the surface.

use std::{collections::BTreeMap, time::Duration};

use reflex_arcade_core::{SurfacePoint, TargetId, TargetSnapshot, TargetView};

use crate::score::{HitOutcome, ScoreRecord};

/// Owns every live target from spawn until it is hit, expires or is cleared.
///
/// Presence in the registry is the "spawned" state. Hits and expiries remove
/// the target, so both are terminal and a target is processed at most once.
#[derive(Clone, Debug, Default)]
pub struct TargetRegistry {
    live: BTreeMap<TargetId, TargetSnapshot>,
    next_id: u64,
}

/// Target removed by a hit together with its score effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitResolution {
    /// Target that was hit.
    pub target: TargetSnapshot,
    /// Effect applied to the score record.
    pub outcome: HitOutcome,
}

/// Target removed by expiry together with whether it broke the streak.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExpiryResolution {
    /// Target that expired.
    pub target: TargetSnapshot,
    /// Whether the expiry counted as a miss.
    pub missed: bool,
}

impl TargetRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a target and returns its snapshot.
    ///
    /// Identifiers are never reused, even across rounds. Returns `None` once
    /// the identifier space is exhausted.
    pub fn spawn(
        &mut self,
        position: SurfacePoint,
        is_penalty: bool,
        lifetime: Duration,
        spawned_at: Duration,
    ) -> Option<TargetSnapshot> {
        let id = TargetId::new(self.next_id);
        self.next_id = self.next_id.checked_add(1)?;
        let snapshot = TargetSnapshot {
            id,
            position,
            is_penalty,
            spawned_at,
            lifetime,
        };
        let _ = self.live.insert(id, snapshot);
        Some(snapshot)
    }

    /// Resolves a hit on a live target.
    ///
    /// Returns `None` without touching `score` if the target was already hit,
    /// expired or cleared.
    pub fn hit(&mut self, id: TargetId, score: &mut ScoreRecord) -> Option<HitResolution> {
        let target = self.live.remove(&id)?;
        let outcome = score.apply_hit(target.is_penalty);
        Some(HitResolution { target, outcome })
    }

    /// Resolves the expiry of a live target at round time `now`.
    ///
    /// Returns `None` if the target is no longer live or its lifetime has not
    /// elapsed yet. Expired penalty targets leave `score` untouched.
    pub fn expire(
        &mut self,
        id: TargetId,
        now: Duration,
        score: &mut ScoreRecord,
    ) -> Option<ExpiryResolution> {
        if !self.live.get(&id)?.is_expired_at(now) {
            return None;
        }

        let target = self.live.remove(&id)?;
        let missed = !target.is_penalty;
        if missed {
            score.apply_miss();
        }
        Some(ExpiryResolution { target, missed })
    }

    /// Removes every live target without affecting the score.
    pub fn clear_all(&mut self) -> Vec<TargetId> {
        let cleared = self.live.keys().copied().collect();
        self.live.clear();
        cleared
    }

    /// Looks up a live target.
    #[must_use]
    pub fn get(&self, id: TargetId) -> Option<&TargetSnapshot> {
        self.live.get(&id)
    }

    /// Number of live targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Reports whether no targets are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Captures a read-only view of the live targets.
    #[must_use]
    pub fn view(&self) -> TargetView {
        TargetView::from_snapshots(self.live.values().copied().collect())
    }
}
