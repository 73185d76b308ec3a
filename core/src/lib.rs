#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Reflex Arcade engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! presentation layers to react to. Systems consume event streams, query
//! immutable snapshots, and respond exclusively with new command batches.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Length of a single round, shared by every difficulty.
pub const ROUND_DURATION: Duration = Duration::from_secs(30);

/// Distance kept clear between spawned targets and every edge of the surface.
pub const SPAWN_MARGIN: f32 = 40.0;

/// Width of the playing surface used until an adapter configures its own.
pub const DEFAULT_SURFACE_WIDTH: f32 = 640.0;

/// Height of the playing surface used until an adapter configures its own.
pub const DEFAULT_SURFACE_HEIGHT: f32 = 420.0;

/// Points awarded for every non-penalty hit before streak bonuses.
pub const HIT_POINTS: u32 = 10;

/// Points deducted when a penalty target is hit.
pub const PENALTY_POINTS: u32 = 5;

/// Number of consecutive hits that unlock each bonus step.
pub const STREAK_STEP: u32 = 3;

/// Bonus awarded per completed streak step.
pub const STREAK_BONUS: u32 = 4;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the dimensions of the playing surface.
    ConfigureSurface {
        /// Surface that subsequent spawns must fit within.
        surface: Surface,
    },
    /// Requests that the world switch to another difficulty.
    SelectDifficulty {
        /// Difficulty to activate for the next round.
        difficulty: Difficulty,
    },
    /// Requests that a new round begin.
    StartRound {
        /// Moment the round started, used to anchor the round clock.
        at: Timestamp,
    },
    /// Requests that the active round be suspended.
    PauseRound,
    /// Requests that a paused round continue.
    ResumeRound {
        /// Moment play resumed, used to re-anchor the round clock.
        at: Timestamp,
    },
    /// Requests that the world discard the current round and return to idle.
    ResetRound,
    /// Advances the round clock to the provided frame timestamp.
    Frame {
        /// Timestamp at which the frame was produced.
        at: Timestamp,
    },
    /// Requests that a target appear on the surface.
    SpawnTarget {
        /// Location of the target's centre.
        position: SurfacePoint,
        /// Whether hitting the target costs points.
        is_penalty: bool,
        /// Duration the target stays on the surface before expiring.
        lifetime: Duration,
    },
    /// Reports that the player clicked a target.
    HitTarget {
        /// Identifier of the clicked target.
        target: TargetId,
    },
    /// Reports that the player clicked the surface without touching a target.
    MissBoard,
    /// Requests that a target whose lifetime elapsed be removed.
    ExpireTarget {
        /// Identifier of the target to expire.
        target: TargetId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the round clock advanced while the round was active.
    TimeAdvanced {
        /// Duration of play time that elapsed in the frame.
        dt: Duration,
    },
    /// Announces the remaining round time after it changed.
    TimeChanged {
        /// Time left before the round ends.
        time_left: Duration,
    },
    /// Announces a new round phase or status message.
    StatusChanged {
        /// Phase the round is in after processing the command.
        phase: RoundPhase,
        /// Message describing what just happened.
        message: StatusMessage,
    },
    /// Confirms that another difficulty became active.
    DifficultyChanged {
        /// Difficulty that is now selected.
        difficulty: Difficulty,
    },
    /// Announces the best score that should be displayed for a difficulty.
    BestScoreChanged {
        /// Difficulty the best score belongs to.
        difficulty: Difficulty,
        /// Best score recorded for the difficulty.
        best: u32,
    },
    /// Announces the current score and streak after either changed.
    ScoreChanged {
        /// Score accumulated in the current round.
        score: u32,
        /// Number of consecutive non-penalty hits.
        streak: u32,
    },
    /// Confirms that a target appeared on the surface.
    TargetSpawned {
        /// Snapshot of the newly spawned target.
        target: TargetSnapshot,
    },
    /// Confirms that a target left the surface.
    TargetRemoved {
        /// Identifier of the removed target.
        target: TargetId,
        /// Reason the target was removed.
        cause: RemovalCause,
    },
    /// Announces that the round clock ran out.
    RoundEnded {
        /// Difficulty the round was played at.
        difficulty: Difficulty,
        /// Final score of the round.
        score: u32,
        /// Streak held when the round ended.
        streak: u32,
        /// Best score for the difficulty after reconciliation.
        best: u32,
        /// Whether the round set a new best score.
        new_best: bool,
    },
}

/// Difficulty levels selectable between rounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Slow cadence with long-lived targets.
    Easy,
    /// Balanced cadence; also the fallback for unknown keys.
    #[default]
    Medium,
    /// Fast cadence with short-lived targets and frequent penalties.
    Hard,
}

impl Difficulty {
    /// Every difficulty in ascending order.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Resolves a difficulty from its key, falling back to [`Difficulty::Medium`].
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        match key.trim() {
            "easy" => Self::Easy,
            "medium" => Self::Medium,
            "hard" => Self::Hard,
            _ => Self::Medium,
        }
    }

    /// Stable key used by control surfaces and persisted records.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Timing profile associated with the difficulty.
    #[must_use]
    pub const fn profile(self) -> DifficultyProfile {
        match self {
            Self::Easy => DifficultyProfile::new(
                Duration::from_millis(900),
                Duration::from_millis(1300),
                0.18,
            ),
            Self::Medium => DifficultyProfile::new(
                Duration::from_millis(650),
                Duration::from_millis(1050),
                0.25,
            ),
            Self::Hard => DifficultyProfile::new(
                Duration::from_millis(480),
                Duration::from_millis(900),
                0.32,
            ),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Spawn cadence, target lifetime and penalty odds for a difficulty.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyProfile {
    spawn_interval: Duration,
    lifetime: Duration,
    penalty_chance: f64,
}

impl DifficultyProfile {
    const fn new(spawn_interval: Duration, lifetime: Duration, penalty_chance: f64) -> Self {
        Self {
            spawn_interval,
            lifetime,
            penalty_chance,
        }
    }

    /// Looks up the profile for a difficulty key, falling back to medium.
    #[must_use]
    pub fn lookup(key: &str) -> Self {
        Difficulty::from_key(key).profile()
    }

    /// Time between consecutive spawns.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Time a target stays on the surface before expiring.
    #[must_use]
    pub const fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Probability in `[0, 1]` that a spawned target is a penalty target.
    #[must_use]
    pub const fn penalty_chance(&self) -> f64 {
        self.penalty_chance
    }
}

/// Phase of the current round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RoundPhase {
    /// No round has started since the last reset.
    #[default]
    Idle,
    /// The round is running and the clock is counting down.
    Active,
    /// The round is running but the clock and spawning are suspended.
    Paused,
    /// The clock ran out; the round awaits a reset.
    Ended,
}

impl RoundPhase {
    /// Reports whether a round is in progress, paused or not.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Active | Self::Paused)
    }

    /// Reports whether the difficulty may be changed in this phase.
    #[must_use]
    pub const fn allows_difficulty_change(self) -> bool {
        matches!(self, Self::Idle | Self::Ended)
    }
}

/// Human-facing status line emitted alongside phase changes and hits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusMessage {
    /// Shown while idle, inviting the player to start.
    Welcome,
    /// Shown when a round starts.
    GameOn,
    /// Shown while the round is paused.
    Paused,
    /// Shown when a paused round resumes.
    Resumed,
    /// Shown after a non-penalty hit.
    Hit {
        /// Streak after the hit.
        streak: u32,
        /// Bonus points awarded on top of the base points.
        bonus: u32,
    },
    /// Shown after a penalty target was hit.
    PenaltyHit,
    /// Shown after a non-penalty target expired unclicked.
    Missed,
    /// Shown after a click that landed on the surface instead of a target.
    BoardMiss,
    /// Shown when the round clock ran out.
    TimeUp {
        /// Final score of the round.
        score: u32,
        /// Streak held when the round ended.
        streak: u32,
    },
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Welcome => f.write_str("Press start to play. Hit the glowing targets!"),
            Self::GameOn => f.write_str("Game on! Hit the orange targets, avoid the red ones."),
            Self::Paused => f.write_str("Paused. Targets are frozen until you resume."),
            Self::Resumed => f.write_str("Back in! Keep chasing those targets."),
            Self::Hit { streak, bonus } => {
                write!(f, "Nice hit! Streak: {streak} (bonus +{bonus}).")
            }
            Self::PenaltyHit => f.write_str("Ouch! That one was a penalty target."),
            Self::Missed => f.write_str("Missed a target. Streak reset."),
            Self::BoardMiss => f.write_str("Click the target itself, not the board."),
            Self::TimeUp { score, streak } => write!(
                f,
                "Time's up! Final score: {score} with a streak of {streak}. Reset to play again."
            ),
        }
    }
}

/// Reason a target left the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemovalCause {
    /// The player clicked the target.
    Hit,
    /// The target's lifetime elapsed before it was clicked.
    Expired,
    /// The round ended or was reset while the target was live.
    Cleared,
}

/// Monotonic instant expressed as an offset from a host-chosen origin.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Timestamp(Duration);

impl Timestamp {
    /// Instant coinciding with the origin.
    pub const ORIGIN: Timestamp = Timestamp(Duration::ZERO);

    /// Creates a timestamp located `offset` after the origin.
    #[must_use]
    pub const fn from_offset(offset: Duration) -> Self {
        Self(offset)
    }

    /// Creates a timestamp located the given number of milliseconds after the origin.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    /// Offset of the timestamp from the origin.
    #[must_use]
    pub const fn offset(&self) -> Duration {
        self.0
    }

    /// Time elapsed since `earlier`, or zero if `earlier` lies in the future.
    #[must_use]
    pub fn saturating_duration_since(self, earlier: Timestamp) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

/// Unique identifier assigned to a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(u64);

impl TargetId {
    /// Creates a new target identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Point on the playing surface measured from its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfacePoint {
    x: f32,
    y: f32,
}

impl SurfacePoint {
    /// Creates a point from horizontal and vertical offsets.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal offset from the left edge.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical offset from the top edge.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }
}

/// Dimensions of the rectangular playing surface.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    width: f32,
    height: f32,
}

impl Surface {
    /// Creates a surface description; negative or non-finite dimensions are
    /// clamped to zero.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: sanitize_extent(width),
            height: sanitize_extent(height),
        }
    }

    /// Width of the surface.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height of the surface.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Inclusive horizontal range in which target centres may spawn.
    #[must_use]
    pub fn spawn_range_x(&self) -> (f32, f32) {
        inset_range(self.width, SPAWN_MARGIN)
    }

    /// Inclusive vertical range in which target centres may spawn.
    #[must_use]
    pub fn spawn_range_y(&self) -> (f32, f32) {
        inset_range(self.height, SPAWN_MARGIN)
    }

    /// Reports whether the point lies inside the margin-inset spawn area.
    #[must_use]
    pub fn contains_spawn_point(&self, point: SurfacePoint) -> bool {
        let (min_x, max_x) = self.spawn_range_x();
        let (min_y, max_y) = self.spawn_range_y();
        (min_x..=max_x).contains(&point.x()) && (min_y..=max_y).contains(&point.y())
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(DEFAULT_SURFACE_WIDTH, DEFAULT_SURFACE_HEIGHT)
    }
}

fn sanitize_extent(extent: f32) -> f32 {
    if extent.is_finite() {
        extent.max(0.0)
    } else {
        0.0
    }
}

/// Shrinks `[0, extent]` by `margin` on both ends, collapsing to the centre
/// when the extent is too small to honour the margin.
fn inset_range(extent: f32, margin: f32) -> (f32, f32) {
    let extent = sanitize_extent(extent);
    if extent < margin * 2.0 {
        let centre = extent / 2.0;
        (centre, centre)
    } else {
        (margin, extent - margin)
    }
}

/// Immutable representation of a single live target used for queries and events.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetSnapshot {
    /// Unique identifier assigned to the target.
    pub id: TargetId,
    /// Location of the target's centre.
    pub position: SurfacePoint,
    /// Whether hitting the target costs points.
    pub is_penalty: bool,
    /// Round time at which the target spawned.
    pub spawned_at: Duration,
    /// Duration the target stays live before expiring.
    pub lifetime: Duration,
}

impl TargetSnapshot {
    /// Reports whether the target's lifetime elapsed at round time `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: Duration) -> bool {
        now.saturating_sub(self.spawned_at) >= self.lifetime
    }
}

/// Read-only snapshot describing all live targets.
#[derive(Clone, Debug, Default)]
pub struct TargetView {
    snapshots: Vec<TargetSnapshot>,
}

impl TargetView {
    /// Creates a new target view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TargetSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured target snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TargetSnapshot> {
        self.snapshots.iter()
    }

    /// Number of live targets captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no targets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Best score achieved at every difficulty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BestScores {
    easy: u32,
    medium: u32,
    hard: u32,
}

impl BestScores {
    /// Creates a table from explicit per-difficulty values.
    #[must_use]
    pub const fn new(easy: u32, medium: u32, hard: u32) -> Self {
        Self { easy, medium, hard }
    }

    /// Best score recorded for the difficulty.
    #[must_use]
    pub const fn get(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }

    /// Records `score` for the difficulty if it beats the stored best.
    ///
    /// Stored values never decrease: equal or lower scores leave the table
    /// untouched and report `updated == false`.
    pub fn reconcile(&mut self, difficulty: Difficulty, score: u32) -> Reconciliation {
        let slot = match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Hard => &mut self.hard,
        };
        let updated = score > *slot;
        if updated {
            *slot = score;
        }
        Reconciliation {
            updated,
            best: *slot,
        }
    }

    /// Iterator over every difficulty paired with its best score.
    pub fn iter(&self) -> impl Iterator<Item = (Difficulty, u32)> + '_ {
        Difficulty::ALL
            .into_iter()
            .map(move |difficulty| (difficulty, self.get(difficulty)))
    }
}

/// Result of reconciling a final score against the best-score table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reconciliation {
    /// Whether the stored best changed.
    pub updated: bool,
    /// Best score stored after reconciliation.
    pub best: u32,
}
