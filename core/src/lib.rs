#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Trail Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values that double as
//! the simulation's structured log records. Systems consume immutable
//! snapshot views and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Trail Defence.";

/// Label deriving the RNG stream that samples trail waypoint x positions.
pub const RNG_STREAM_TRAIL_X: &str = "trail.x";

/// Label deriving the RNG stream that samples trail waypoint y positions.
pub const RNG_STREAM_TRAIL_Y: &str = "trail.y";

/// Health assigned to every enemy when it spawns.
pub const ENEMY_SPAWN_HEALTH: Health = Health::new(100);

/// Damage dealt to the base by each enemy that reaches the trail's end.
pub const ENEMY_BASE_DAMAGE: u32 = 10;

/// Lower bound the spawn-interval progression curve never shrinks below.
pub const SPAWN_INTERVAL_FLOOR: Duration = Duration::from_millis(250);

const RAMP_STEP_LIMIT: u32 = 16;

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Point in continuous play-area coordinates measured in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a new position from world-unit coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate of the position.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate of the position.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Computes the squared Euclidean distance to another position.
    #[must_use]
    pub fn distance_squared(self, other: Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Computes the Euclidean distance to another position.
    #[must_use]
    pub fn distance(self, other: Position) -> f32 {
        self.distance_squared(other).sqrt()
    }
}

/// Saturating hit-point counter shared by enemies and the base.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Health(u32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the remaining hit points.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether the hit points are exhausted.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Subtracts damage without underflowing below zero.
    #[must_use]
    pub const fn saturating_sub(self, damage: u32) -> Self {
        Self(self.0.saturating_sub(damage))
    }
}

/// Rectangular region enemies and towers inhabit.
///
/// The horizontal extent spans `min_x..=max_x`; the vertical extent spans
/// `0..=height`. Defaults match the original playable-area layout: the
/// world crate configures `300..1100` by `600`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    min_x: f32,
    max_x: f32,
    height: f32,
}

impl PlayArea {
    /// Creates a new play area from edge coordinates.
    #[must_use]
    pub const fn new(min_x: f32, max_x: f32, height: f32) -> Self {
        Self {
            min_x,
            max_x,
            height,
        }
    }

    /// Left edge where trails begin.
    #[must_use]
    pub const fn min_x(&self) -> f32 {
        self.min_x
    }

    /// Right edge where trails end.
    #[must_use]
    pub const fn max_x(&self) -> f32 {
        self.max_x
    }

    /// Vertical extent of the area.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Horizontal extent of the area.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    /// Reports whether the position lies inside the area.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        position.x() >= self.min_x
            && position.x() <= self.max_x
            && position.y() >= 0.0
            && position.y() <= self.height
    }
}

/// Polyline that enemies traverse from the left edge to the right edge.
///
/// Construction validates the shape invariants once; afterwards every
/// progress value maps to a point via linear interpolation.
#[derive(Clone, Debug, PartialEq)]
pub struct Trail {
    waypoints: Vec<Position>,
    cumulative: Vec<f32>,
}

impl Trail {
    /// Builds a trail from ordered waypoints.
    ///
    /// Returns `None` when fewer than two waypoints are supplied or any
    /// consecutive pair fails to make forward progress along x, which would
    /// produce a zero-length or backtracking segment.
    #[must_use]
    pub fn from_waypoints(waypoints: Vec<Position>) -> Option<Self> {
        if waypoints.len() < 2 {
            return None;
        }

        let mut cumulative = Vec::with_capacity(waypoints.len());
        cumulative.push(0.0);
        for pair in waypoints.windows(2) {
            if pair[1].x() <= pair[0].x() {
                return None;
            }
            let length = pair[0].distance(pair[1]);
            if length <= 0.0 {
                return None;
            }
            let previous = *cumulative.last().unwrap_or(&0.0);
            cumulative.push(previous + length);
        }

        Some(Self {
            waypoints,
            cumulative,
        })
    }

    /// Ordered waypoints that define the trail.
    #[must_use]
    pub fn waypoints(&self) -> &[Position] {
        &self.waypoints
    }

    /// Total arc length of the trail in world units.
    #[must_use]
    pub fn total_length(&self) -> f32 {
        *self.cumulative.last().unwrap_or(&0.0)
    }

    /// First waypoint, where enemies spawn.
    #[must_use]
    pub fn start(&self) -> Position {
        self.waypoints[0]
    }

    /// Final waypoint, where the base stands.
    #[must_use]
    pub fn end(&self) -> Position {
        self.waypoints[self.waypoints.len() - 1]
    }

    /// Interpolates the point at the provided arc-length progress.
    ///
    /// Progress values are clamped to `[0, total_length]`.
    #[must_use]
    pub fn position_at(&self, progress: f32) -> Position {
        let clamped = progress.clamp(0.0, self.total_length());

        let mut index = 0;
        while index + 1 < self.waypoints.len() - 1 && self.cumulative[index + 1] < clamped {
            index += 1;
        }

        let segment_start = self.cumulative[index];
        let segment_length = self.cumulative[index + 1] - segment_start;
        let fraction = (clamped - segment_start) / segment_length;
        let from = self.waypoints[index];
        let to = self.waypoints[index + 1];
        Position::new(
            from.x() + (to.x() - from.x()) * fraction,
            from.y() + (to.y() - from.y()) * fraction,
        )
    }
}

/// Types of towers that can be constructed along the trail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Fast-firing tower with a short reach and no placement cost.
    Light,
    /// Slow, hard-hitting tower with a longer reach and a score cost.
    Heavy,
}

impl TowerKind {
    /// Targeting radius measured in world units.
    #[must_use]
    pub const fn range(self) -> f32 {
        match self {
            Self::Light => 150.0,
            Self::Heavy => 200.0,
        }
    }

    /// Damage dealt to the struck enemy per shot.
    #[must_use]
    pub const fn damage(self) -> u32 {
        match self {
            Self::Light => 25,
            Self::Heavy => 30,
        }
    }

    /// Minimum simulated time between successive shots.
    #[must_use]
    pub const fn fire_cooldown(self) -> Duration {
        match self {
            Self::Light => Duration::from_millis(1_000),
            Self::Heavy => Duration::from_millis(1_500),
        }
    }

    /// Score deducted when the tower is placed.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Light => 0,
            Self::Heavy => 10,
        }
    }
}

/// Named difficulty levels selectable before a session starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Slow spawns and slow enemies.
    Easy,
    /// Default cadence.
    Medium,
    /// Fast spawns and fast enemies.
    Hard,
}

impl Difficulty {
    /// Resolves the spawn and speed parameters for the level.
    #[must_use]
    pub const fn profile(self) -> DifficultyProfile {
        match self {
            Self::Easy => DifficultyProfile::new(Duration::from_secs(3), 60.0, 15, 0.3, 0.3),
            Self::Medium => DifficultyProfile::new(Duration::from_secs(2), 100.0, 10, 0.4, 0.4),
            Self::Hard => DifficultyProfile::new(Duration::from_secs(1), 160.0, 5, 0.5, 0.5),
        }
    }
}

/// Spawn cadence and enemy speed parameters bundled per difficulty level.
///
/// The progression curve tightens both parameters as the player's score
/// crosses multiples of the threshold: the spawn interval shrinks by
/// `spawn_ramp` per step (floored at [`SPAWN_INTERVAL_FLOOR`]) and the speed
/// of newly spawned enemies grows by `speed_ramp` per step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyProfile {
    spawn_interval: Duration,
    enemy_speed: f32,
    score_threshold: u32,
    spawn_ramp: f32,
    speed_ramp: f32,
}

impl DifficultyProfile {
    /// Creates a new profile from explicit parameters.
    #[must_use]
    pub const fn new(
        spawn_interval: Duration,
        enemy_speed: f32,
        score_threshold: u32,
        spawn_ramp: f32,
        speed_ramp: f32,
    ) -> Self {
        Self {
            spawn_interval,
            enemy_speed,
            score_threshold,
            spawn_ramp,
            speed_ramp,
        }
    }

    /// Base interval between enemy spawns.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Base speed of spawned enemies in world units per second.
    #[must_use]
    pub const fn enemy_speed(&self) -> f32 {
        self.enemy_speed
    }

    /// Score required to advance the progression curve by one step.
    #[must_use]
    pub const fn score_threshold(&self) -> u32 {
        self.score_threshold
    }

    /// Spawn interval after applying the progression curve for the score.
    #[must_use]
    pub fn spawn_interval_at(&self, score: u32) -> Duration {
        let steps = self.ramp_steps(score);
        if steps == 0 {
            return self.spawn_interval;
        }

        let factor = (1.0 - self.spawn_ramp).powi(steps as i32);
        let ramped = self.spawn_interval.mul_f32(factor);
        ramped.max(SPAWN_INTERVAL_FLOOR)
    }

    /// Enemy speed after applying the progression curve for the score.
    #[must_use]
    pub fn enemy_speed_at(&self, score: u32) -> f32 {
        let steps = self.ramp_steps(score);
        if steps == 0 {
            return self.enemy_speed;
        }

        self.enemy_speed * (1.0 + self.speed_ramp).powi(steps as i32)
    }

    // The limit keeps the late-game curve finite.
    fn ramp_steps(&self, score: u32) -> u32 {
        if self.score_threshold == 0 {
            return 0;
        }
        (score / self.score_threshold).min(RAMP_STEP_LIMIT)
    }
}

/// Lifecycle of a simulation session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Session configured but not yet started; difficulty may change.
    NotStarted,
    /// Simulation advancing; `Tick` commands mutate state.
    Running,
    /// Simulation suspended; no time advances.
    Paused,
    /// Terminal phase entered when the base's health is exhausted.
    GameOver,
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The session has ended; no further construction is possible.
    SessionOver,
    /// The requested position lies outside the play area.
    OutOfBounds,
    /// The player's score cannot cover the tower's cost.
    InsufficientScore,
}

/// Reasons a difficulty selection request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifficultyError {
    /// Difficulty is immutable once a session has started.
    SessionActive,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Configures the play area and base health before a session starts.
    ConfigureSession {
        /// Region that bounds trails, enemies, and tower placement.
        play_area: PlayArea,
        /// Hit points the base starts the session with.
        base_health: Health,
    },
    /// Requests the active difficulty level before a session starts.
    SelectDifficulty {
        /// Level the session should adopt.
        level: Difficulty,
    },
    /// Begins the session, generating the trail from the provided seed.
    StartSession {
        /// Seed that fully determines the session's trail.
        seed: u64,
    },
    /// Suspends a running session.
    Pause,
    /// Resumes a paused session.
    Resume,
    /// Requests placement of a tower at the provided position.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Center of the tower in play-area coordinates.
        position: Position,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new enemy enter the trail at its start.
    SpawnEnemy {
        /// Hit points assigned to the enemy.
        health: Health,
        /// Speed of the enemy in world units per second.
        speed: f32,
    },
    /// Requests that a tower strike an enemy.
    FireProjectile {
        /// Tower performing the shot.
        tower: TowerId,
        /// Enemy the shot is aimed at.
        enemy: EnemyId,
    },
}

/// Events broadcast by the world after processing commands.
///
/// These double as the simulation's structured log records; the session
/// orchestrator mirrors each onto the `log` facade.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms the difficulty level adopted for the upcoming session.
    DifficultySelected {
        /// Level that became active.
        level: Difficulty,
    },
    /// Reports that a difficulty selection request was rejected.
    DifficultySelectionRejected {
        /// Level requested by the caller.
        level: Difficulty,
        /// Specific reason the selection failed.
        reason: DifficultyError,
    },
    /// Announces that the session transitioned to `Running`.
    SessionStarted {
        /// Seed the trail was generated from.
        seed: u64,
    },
    /// Announces that a running session was suspended.
    SessionPaused,
    /// Announces that a paused session resumed.
    SessionResumed,
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy entered the trail.
    EnemySpawned {
        /// Identifier assigned to the enemy by the world.
        enemy: EnemyId,
        /// Hit points the enemy spawned with.
        health: Health,
        /// Speed assigned to the enemy in world units per second.
        speed: f32,
    },
    /// Reports that an enemy crossed the trail's end and damaged the base.
    EnemyReachedEnd {
        /// Identifier of the enemy that leaked through.
        enemy: EnemyId,
        /// Base hit points remaining after the damage was applied.
        base_health: Health,
    },
    /// Reports that an enemy's health was exhausted by tower fire.
    EnemyKilled {
        /// Identifier of the destroyed enemy.
        enemy: EnemyId,
        /// Player score after the kill was awarded.
        score: u32,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Center of the tower in play-area coordinates.
        position: Position,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Position provided in the placement request.
        position: Position,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower struck an enemy.
    TowerFired {
        /// Tower that performed the shot.
        tower: TowerId,
        /// Enemy that was struck.
        enemy: EnemyId,
        /// Damage applied to the enemy.
        damage: u32,
    },
    /// Announces that the base fell and the session entered `GameOver`.
    BaseDestroyed {
        /// Final score at the moment the base fell.
        score: u32,
    },
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Interpolated position of the enemy along the trail.
    pub position: Position,
    /// Arc-length progress along the trail in world units.
    pub progress: f32,
    /// Remaining hit points.
    pub health: Health,
    /// Speed in world units per second.
    pub speed: f32,
}

/// Read-only snapshot describing all enemies on the trail.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Center of the tower in play-area coordinates.
    pub position: Position,
}

/// Read-only snapshot describing all towers along the trail.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Cooldown readiness of a single tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerCooldownSnapshot {
    /// Tower the cooldown belongs to.
    pub tower: TowerId,
    /// Kind of the tower.
    pub kind: TowerKind,
    /// Remaining time until the tower may fire again.
    pub ready_in: Duration,
}

/// Read-only view of tower cooldowns sorted by tower identifier.
#[derive(Clone, Debug, Default)]
pub struct TowerCooldownView {
    snapshots: Vec<TowerCooldownSnapshot>,
}

impl TowerCooldownView {
    /// Creates a new cooldown view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerCooldownSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.tower);
        Self { snapshots }
    }

    /// Consumes the view, yielding the underlying sorted snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerCooldownSnapshot> {
        self.snapshots
    }
}

/// A tower's deterministic target assignment for the current tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerTarget {
    /// Tower the assignment belongs to.
    pub tower: TowerId,
    /// Enemy selected by the priority rule.
    pub enemy: EnemyId,
}
