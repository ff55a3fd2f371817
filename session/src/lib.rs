#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session orchestration for Trail Defence.
//!
//! A [`Session`] owns the authoritative world together with the pure systems
//! and drives them in a fixed per-frame order: spawn commands, the clock
//! tick, then targeting and combat. Input collaborators mutate the session
//! exclusively through its methods; render collaborators read it through
//! [`Session::world`] and the world's query module. Every event the world
//! emits is appended to the caller's buffer and mirrored onto the `log`
//! facade, so embedders choose the destination of the records.

use std::time::Duration;

use thiserror::Error;
use trail_defence_core::{
    Command, Difficulty, Event, Health, PlayArea, Position, SessionPhase, TowerKind, TowerTarget,
};
use trail_defence_system_spawning::Spawning;
use trail_defence_system_tower_combat::TowerCombat;
use trail_defence_system_tower_targeting::TowerTargeting;
use trail_defence_world::{self as world, query, World};

/// Longest simulated delta a single update slice may consume.
///
/// Larger frame deltas, such as those observed after the process was
/// suspended by the OS, are split into slices of at most this length so
/// enemies cannot skip past towers between evaluations.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// Parameters fixed at session construction time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionConfig {
    /// Seed that fully determines the session's trail.
    pub seed: u64,
    /// Difficulty level the session runs at.
    pub difficulty: Difficulty,
    /// Hit points the base starts the session with.
    pub base_health: Health,
    /// Region that bounds trails, enemies, and tower placement.
    pub play_area: PlayArea,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            difficulty: Difficulty::Medium,
            base_health: world::DEFAULT_BASE_HEALTH,
            play_area: world::DEFAULT_PLAY_AREA,
        }
    }
}

/// Reasons a session configuration is rejected before any state exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The play area has no interior for trails or towers.
    #[error("play area must have positive width and height")]
    DegeneratePlayArea,
    /// A base without hit points would end the session immediately.
    #[error("base health must be greater than zero")]
    ZeroBaseHealth,
}

/// Owns the world and systems and drives the simulation loop.
#[derive(Debug)]
pub struct Session {
    world: World,
    seed: u64,
    spawning: Spawning,
    targeting: TowerTargeting,
    combat: TowerCombat,
    command_scratch: Vec<Command>,
    target_scratch: Vec<TowerTarget>,
}

impl Session {
    /// Validates the configuration and prepares a not-yet-started session.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        if config.play_area.width() <= 0.0 || config.play_area.height() <= 0.0 {
            return Err(ConfigError::DegeneratePlayArea);
        }
        if config.base_health.is_zero() {
            return Err(ConfigError::ZeroBaseHealth);
        }

        let mut session = Self {
            world: World::new(),
            seed: config.seed,
            spawning: Spawning::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            command_scratch: Vec::new(),
            target_scratch: Vec::new(),
        };

        let mut events = Vec::new();
        session.apply(
            Command::ConfigureSession {
                play_area: config.play_area,
                base_health: config.base_health,
            },
            &mut events,
        );
        session.apply(
            Command::SelectDifficulty {
                level: config.difficulty,
            },
            &mut events,
        );
        Ok(session)
    }

    /// Read-only access to the authoritative world for query consumers.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Current phase of the session lifecycle.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        query::session_phase(&self.world)
    }

    /// Player score accumulated from destroyed enemies.
    #[must_use]
    pub fn score(&self) -> u32 {
        query::score(&self.world)
    }

    /// Remaining hit points of the base.
    #[must_use]
    pub fn base_health(&self) -> Health {
        query::base_health(&self.world)
    }

    /// Simulated time accumulated across all update slices.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        query::elapsed(&self.world)
    }

    /// Generates the trail from the configured seed and begins the session.
    pub fn start(&mut self, out_events: &mut Vec<Event>) {
        self.apply(Command::StartSession { seed: self.seed }, out_events);
    }

    /// Requests a difficulty change; rejected once the session has started.
    pub fn select_difficulty(&mut self, level: Difficulty, out_events: &mut Vec<Event>) {
        self.apply(Command::SelectDifficulty { level }, out_events);
    }

    /// Suspends a running session.
    pub fn pause(&mut self, out_events: &mut Vec<Event>) {
        self.apply(Command::Pause, out_events);
    }

    /// Resumes a paused session.
    pub fn resume(&mut self, out_events: &mut Vec<Event>) {
        self.apply(Command::Resume, out_events);
    }

    /// Requests placement of a tower at the provided position.
    pub fn place_tower(
        &mut self,
        kind: TowerKind,
        position: Position,
        out_events: &mut Vec<Event>,
    ) {
        self.apply(Command::PlaceTower { kind, position }, out_events);
    }

    /// Advances the simulation by the frame delta.
    ///
    /// The delta is consumed in slices of at most [`MAX_FRAME_DELTA`]; each
    /// slice runs the fixed pipeline of spawn commands, the clock tick, and
    /// the targeting/combat pass. Calls in any non-running phase leave the
    /// session untouched, including after game over.
    pub fn step(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let mut remaining = dt;
        while !remaining.is_zero() {
            if self.phase() != SessionPhase::Running {
                return;
            }
            let slice = remaining.min(MAX_FRAME_DELTA);
            remaining -= slice;
            self.step_slice(slice, out_events);
        }
    }

    fn step_slice(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let profile = query::difficulty(&self.world).profile();
        let score = query::score(&self.world);
        let interval = profile.spawn_interval_at(score);
        let speed = profile.enemy_speed_at(score);

        let mut commands = std::mem::take(&mut self.command_scratch);
        commands.clear();
        self.spawning
            .handle(dt, SessionPhase::Running, interval, speed, &mut commands);
        for command in commands.drain(..) {
            self.apply(command, out_events);
        }

        self.apply(Command::Tick { dt }, out_events);

        // The tick may have ended the session; the systems observe the
        // post-tick phase and stay silent once the base has fallen.
        let phase = query::session_phase(&self.world);
        let towers = query::tower_view(&self.world);
        let enemies = query::enemy_view(&self.world);
        self.targeting
            .handle(phase, &towers, &enemies, &mut self.target_scratch);

        let cooldowns = query::tower_cooldown_view(&self.world);
        self.combat
            .handle(phase, cooldowns, &self.target_scratch, &mut commands);
        for command in commands.drain(..) {
            self.apply(command, out_events);
        }
        self.command_scratch = commands;
    }

    fn apply(&mut self, command: Command, out_events: &mut Vec<Event>) {
        let recorded_from = out_events.len();
        world::apply(&mut self.world, command, out_events);
        record(&out_events[recorded_from..]);
    }
}

/// Mirrors world events onto the `log` facade.
fn record(events: &[Event]) {
    for event in events {
        match event {
            Event::DifficultySelected { level } => {
                log::info!("difficulty set to {level:?}");
            }
            Event::DifficultySelectionRejected { level, reason } => {
                log::warn!("difficulty change to {level:?} rejected: {reason:?}");
            }
            Event::SessionStarted { seed } => {
                log::info!("session started with seed {seed}");
            }
            Event::SessionPaused => log::info!("session paused"),
            Event::SessionResumed => log::info!("session resumed"),
            Event::TimeAdvanced { dt } => {
                log::trace!("clock advanced by {}ms", dt.as_millis());
            }
            Event::EnemySpawned {
                enemy,
                health,
                speed,
            } => {
                log::debug!(
                    "enemy {} spawned with {} health at speed {speed:.1}",
                    enemy.get(),
                    health.get()
                );
            }
            Event::EnemyReachedEnd { enemy, base_health } => {
                log::info!(
                    "enemy {} reached the base, {} base health remaining",
                    enemy.get(),
                    base_health.get()
                );
            }
            Event::EnemyKilled { enemy, score } => {
                log::debug!("enemy {} destroyed, score {score}", enemy.get());
            }
            Event::TowerPlaced {
                tower,
                kind,
                position,
            } => {
                log::info!(
                    "{kind:?} tower {} placed at ({:.0}, {:.0})",
                    tower.get(),
                    position.x(),
                    position.y()
                );
            }
            Event::TowerPlacementRejected {
                kind,
                position,
                reason,
            } => {
                log::warn!(
                    "{kind:?} tower placement at ({:.0}, {:.0}) rejected: {reason:?}",
                    position.x(),
                    position.y()
                );
            }
            Event::TowerFired {
                tower,
                enemy,
                damage,
            } => {
                log::debug!(
                    "tower {} fired at enemy {} for {damage} damage",
                    tower.get(),
                    enemy.get()
                );
            }
            Event::BaseDestroyed { score } => {
                log::info!("base destroyed, final score {score}");
            }
        }
    }
}
