#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Trail Defence.
//!
//! All mutation flows through [`apply`]; adapters and systems observe the
//! world exclusively through the [`query`] module and the events emitted by
//! each command.

mod towers;

use std::time::Duration;

use towers::TowerRegistry;
use trail_defence_core::{
    Command, Difficulty, DifficultyError, EnemyId, Event, Health, PlacementError, PlayArea,
    SessionPhase, Trail, ENEMY_BASE_DAMAGE, WELCOME_BANNER,
};
use trail_defence_system_trail_generation as trail_generation;

/// Play area adopted when no session configuration is supplied.
pub const DEFAULT_PLAY_AREA: PlayArea = PlayArea::new(300.0, 1_100.0, 600.0);

/// Base hit points adopted when no session configuration is supplied.
pub const DEFAULT_BASE_HEALTH: Health = Health::new(500);

const DEFAULT_DIFFICULTY: Difficulty = Difficulty::Medium;

/// Represents the authoritative Trail Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    phase: SessionPhase,
    difficulty: Difficulty,
    play_area: PlayArea,
    trail: Trail,
    enemies: Vec<EnemyState>,
    towers: TowerRegistry,
    next_enemy_id: u32,
    score: u32,
    base_health: Health,
    elapsed: Duration,
}

impl World {
    /// Creates a new Trail Defence world awaiting session start.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            phase: SessionPhase::NotStarted,
            difficulty: DEFAULT_DIFFICULTY,
            play_area: DEFAULT_PLAY_AREA,
            trail: trail_generation::fallback(&DEFAULT_PLAY_AREA),
            enemies: Vec::new(),
            towers: TowerRegistry::new(),
            next_enemy_id: 0,
            score: 0,
            base_health: DEFAULT_BASE_HEALTH,
            elapsed: Duration::ZERO,
        }
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        id
    }

    fn enemy_mut(&mut self, enemy: EnemyId) -> Option<&mut EnemyState> {
        self.enemies.iter_mut().find(|state| state.id == enemy)
    }

    /// Removes the enemy when it is still present; repeated removal attempts
    /// are a no-op, never an error.
    fn remove_enemy(&mut self, enemy: EnemyId) -> bool {
        let before = self.enemies.len();
        self.enemies.retain(|state| state.id != enemy);
        self.enemies.len() != before
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureSession {
            play_area,
            base_health,
        } => {
            if world.phase != SessionPhase::NotStarted {
                return;
            }
            if play_area.width() <= 0.0 || play_area.height() < 0.0 {
                return;
            }
            world.play_area = play_area;
            world.base_health = base_health;
            world.trail = trail_generation::fallback(&play_area);
        }
        Command::SelectDifficulty { level } => {
            if world.phase == SessionPhase::NotStarted {
                world.difficulty = level;
                out_events.push(Event::DifficultySelected { level });
            } else {
                out_events.push(Event::DifficultySelectionRejected {
                    level,
                    reason: DifficultyError::SessionActive,
                });
            }
        }
        Command::StartSession { seed } => {
            if world.phase != SessionPhase::NotStarted {
                return;
            }
            world.trail = trail_generation::generate(&world.play_area, seed);
            world.phase = SessionPhase::Running;
            out_events.push(Event::SessionStarted { seed });
        }
        Command::Pause => {
            if world.phase == SessionPhase::Running {
                world.phase = SessionPhase::Paused;
                out_events.push(Event::SessionPaused);
            }
        }
        Command::Resume => {
            if world.phase == SessionPhase::Paused {
                world.phase = SessionPhase::Running;
                out_events.push(Event::SessionResumed);
            }
        }
        Command::PlaceTower { kind, position } => {
            let rejection = if world.phase == SessionPhase::GameOver {
                Some(PlacementError::SessionOver)
            } else if !world.play_area.contains(position) {
                Some(PlacementError::OutOfBounds)
            } else if world.score < kind.cost() {
                Some(PlacementError::InsufficientScore)
            } else {
                None
            };

            if let Some(reason) = rejection {
                out_events.push(Event::TowerPlacementRejected {
                    kind,
                    position,
                    reason,
                });
                return;
            }

            world.score -= kind.cost();
            let tower = world.towers.insert(kind, position);
            out_events.push(Event::TowerPlaced {
                tower,
                kind,
                position,
            });
        }
        Command::Tick { dt } => {
            if world.phase != SessionPhase::Running {
                return;
            }

            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });

            let total_length = world.trail.total_length();
            let mut reached: Vec<EnemyId> = Vec::new();
            for enemy in &mut world.enemies {
                if enemy.advance(dt, total_length) {
                    reached.push(enemy.id);
                }
            }

            for enemy in reached {
                if world.remove_enemy(enemy) {
                    world.base_health = world.base_health.saturating_sub(ENEMY_BASE_DAMAGE);
                    out_events.push(Event::EnemyReachedEnd {
                        enemy,
                        base_health: world.base_health,
                    });
                }
            }

            world.towers.cool_down(dt);

            if world.base_health.is_zero() {
                world.phase = SessionPhase::GameOver;
                out_events.push(Event::BaseDestroyed { score: world.score });
            }
        }
        Command::SpawnEnemy { health, speed } => {
            if world.phase != SessionPhase::Running {
                return;
            }

            let id = world.allocate_enemy_id();
            let speed = speed.max(0.0);
            world.enemies.push(EnemyState {
                id,
                progress: 0.0,
                health,
                speed,
            });
            out_events.push(Event::EnemySpawned {
                enemy: id,
                health,
                speed,
            });
        }
        Command::FireProjectile { tower, enemy } => {
            if world.phase != SessionPhase::Running {
                return;
            }

            let Some(kind) = world.towers.ready_kind(tower) else {
                return;
            };
            let damage = kind.damage();

            // A target that died earlier in the same tick leaves the shot
            // unfired; the tower keeps its readiness for the next tick.
            let Some(state) = world.enemy_mut(enemy) else {
                return;
            };
            state.health = state.health.saturating_sub(damage);
            let killed = state.health.is_zero();

            world.towers.reset_cooldown(tower);
            out_events.push(Event::TowerFired {
                tower,
                enemy,
                damage,
            });

            if killed {
                let _ = world.remove_enemy(enemy);
                world.score = world.score.saturating_add(1);
                out_events.push(Event::EnemyKilled {
                    enemy,
                    score: world.score,
                });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use trail_defence_core::{
        Difficulty, EnemySnapshot, EnemyView, Health, PlayArea, SessionPhase,
        TowerCooldownSnapshot, TowerCooldownView, TowerSnapshot, TowerView, Trail,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Current phase of the session lifecycle.
    #[must_use]
    pub fn session_phase(world: &World) -> SessionPhase {
        world.phase
    }

    /// Difficulty level the session runs at.
    #[must_use]
    pub fn difficulty(world: &World) -> Difficulty {
        world.difficulty
    }

    /// Region that bounds trails, enemies, and tower placement.
    #[must_use]
    pub fn play_area(world: &World) -> PlayArea {
        world.play_area
    }

    /// Provides read-only access to the trail enemies traverse.
    #[must_use]
    pub fn trail(world: &World) -> &Trail {
        &world.trail
    }

    /// Player score accumulated from destroyed enemies.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Remaining hit points of the base.
    #[must_use]
    pub fn base_health(world: &World) -> Health {
        world.base_health
    }

    /// Simulated time accumulated across all ticks.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Captures a read-only view of the enemies on the trail.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter()
            .map(|state| EnemySnapshot {
                id: state.id,
                position: world.trail.position_at(state.progress),
                progress: state.progress,
                health: state.health,
                speed: state.speed,
            })
            .collect();
        EnemyView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of the towers along the trail.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        let snapshots: Vec<TowerSnapshot> = world
            .towers
            .iter()
            .map(|state| TowerSnapshot {
                id: state.id,
                kind: state.kind,
                position: state.position,
            })
            .collect();
        TowerView::from_snapshots(snapshots)
    }

    /// Captures the cooldown readiness of every tower.
    #[must_use]
    pub fn tower_cooldown_view(world: &World) -> TowerCooldownView {
        let snapshots: Vec<TowerCooldownSnapshot> = world
            .towers
            .iter()
            .map(|state| TowerCooldownSnapshot {
                tower: state.id,
                kind: state.kind,
                ready_in: state.cooldown,
            })
            .collect();
        TowerCooldownView::from_snapshots(snapshots)
    }
}

#[derive(Clone, Copy, Debug)]
struct EnemyState {
    id: EnemyId,
    progress: f32,
    health: Health,
    speed: f32,
}

impl EnemyState {
    /// Moves the enemy forward and reports whether it crossed the trail end.
    ///
    /// Progress never decreases; the caller removes the enemy immediately
    /// after a `true` return, so the signal fires exactly once.
    fn advance(&mut self, dt: Duration, total_length: f32) -> bool {
        self.progress += self.speed * dt.as_secs_f32();
        self.progress >= total_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trail_defence_core::{Position, TowerKind};

    fn start_world(events: &mut Vec<Event>) -> World {
        let mut world = World::new();
        apply(&mut world, Command::StartSession { seed: 7 }, events);
        world
    }

    fn spawn_stationary(world: &mut World, health: u32, events: &mut Vec<Event>) -> EnemyId {
        apply(
            world,
            Command::SpawnEnemy {
                health: Health::new(health),
                speed: 0.0,
            },
            events,
        );
        match events.last() {
            Some(Event::EnemySpawned { enemy, .. }) => *enemy,
            other => panic!("expected spawn event, got {other:?}"),
        }
    }

    #[test]
    fn new_world_awaits_session_start() {
        let world = World::new();
        assert_eq!(query::session_phase(&world), SessionPhase::NotStarted);
        assert_eq!(query::difficulty(&world), Difficulty::Medium);
        assert_eq!(query::score(&world), 0);
        assert_eq!(query::base_health(&world), Health::new(500));
        assert!(query::enemy_view(&world).into_vec().is_empty());
    }

    #[test]
    fn difficulty_selection_locks_once_started() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SelectDifficulty {
                level: Difficulty::Hard,
            },
            &mut events,
        );
        assert_eq!(query::difficulty(&world), Difficulty::Hard);
        assert_eq!(
            events.last(),
            Some(&Event::DifficultySelected {
                level: Difficulty::Hard
            })
        );

        apply(&mut world, Command::StartSession { seed: 1 }, &mut events);
        apply(
            &mut world,
            Command::SelectDifficulty {
                level: Difficulty::Easy,
            },
            &mut events,
        );
        assert_eq!(query::difficulty(&world), Difficulty::Hard);
        assert_eq!(
            events.last(),
            Some(&Event::DifficultySelectionRejected {
                level: Difficulty::Easy,
                reason: DifficultyError::SessionActive,
            })
        );
    }

    #[test]
    fn starting_generates_trail_spanning_play_area() {
        let mut events = Vec::new();
        let world = start_world(&mut events);
        let area = query::play_area(&world);
        let trail = query::trail(&world);
        let waypoints = trail.waypoints();

        assert_eq!(query::session_phase(&world), SessionPhase::Running);
        assert_eq!(waypoints[0].x(), area.min_x());
        assert_eq!(waypoints[waypoints.len() - 1].x(), area.max_x());
        assert!(trail.total_length() > 0.0);
    }

    #[test]
    fn identical_seeds_generate_identical_trails() {
        let mut first_events = Vec::new();
        let mut second_events = Vec::new();
        let first = start_world(&mut first_events);
        let second = start_world(&mut second_events);
        assert_eq!(query::trail(&first), query::trail(&second));
        assert_eq!(first_events, second_events);
    }

    #[test]
    fn tick_is_ignored_before_start_and_while_paused() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        assert!(events.is_empty());
        assert_eq!(query::elapsed(&world), Duration::ZERO);

        apply(&mut world, Command::StartSession { seed: 3 }, &mut events);
        apply(&mut world, Command::Pause, &mut events);
        assert_eq!(query::session_phase(&world), SessionPhase::Paused);

        let before = events.len();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        assert_eq!(events.len(), before);
        assert_eq!(query::elapsed(&world), Duration::ZERO);

        apply(&mut world, Command::Resume, &mut events);
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        assert_eq!(query::elapsed(&world), Duration::from_secs(1));
    }

    #[test]
    fn placement_rejects_positions_outside_play_area() {
        let mut events = Vec::new();
        let mut world = start_world(&mut events);

        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Light,
                position: Position::new(10.0, 10.0),
            },
            &mut events,
        );
        assert_eq!(
            events.last(),
            Some(&Event::TowerPlacementRejected {
                kind: TowerKind::Light,
                position: Position::new(10.0, 10.0),
                reason: PlacementError::OutOfBounds,
            })
        );
        assert!(query::tower_view(&world).into_vec().is_empty());
    }

    #[test]
    fn heavy_towers_cost_score() {
        let mut events = Vec::new();
        let mut world = start_world(&mut events);
        let position = Position::new(400.0, 300.0);

        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Heavy,
                position,
            },
            &mut events,
        );
        assert_eq!(
            events.last(),
            Some(&Event::TowerPlacementRejected {
                kind: TowerKind::Heavy,
                position,
                reason: PlacementError::InsufficientScore,
            })
        );

        // Earn ten score by felling ten fragile enemies with a light tower.
        let start = query::trail(&world).start();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Light,
                position: start,
            },
            &mut events,
        );
        let light = match events.last() {
            Some(Event::TowerPlaced { tower, .. }) => *tower,
            other => panic!("expected placement event, got {other:?}"),
        };

        for _ in 0..10 {
            let enemy = spawn_stationary(&mut world, 1, &mut events);
            apply(
                &mut world,
                Command::FireProjectile {
                    tower: light,
                    enemy,
                },
                &mut events,
            );
            apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_secs(1),
                },
                &mut events,
            );
        }
        assert_eq!(query::score(&world), 10);

        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Heavy,
                position,
            },
            &mut events,
        );
        assert!(matches!(
            events.last(),
            Some(Event::TowerPlaced {
                kind: TowerKind::Heavy,
                ..
            })
        ));
        assert_eq!(query::score(&world), 0);
    }

    #[test]
    fn leaked_enemies_damage_the_base_once() {
        let mut events = Vec::new();
        let mut world = start_world(&mut events);
        let total = query::trail(&world).total_length();

        apply(
            &mut world,
            Command::SpawnEnemy {
                health: Health::new(100),
                speed: total,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(1_100),
            },
            &mut events,
        );

        let reached: Vec<&Event> = events
            .iter()
            .filter(|event| matches!(event, Event::EnemyReachedEnd { .. }))
            .collect();
        assert_eq!(reached.len(), 1);
        assert_eq!(query::base_health(&world), Health::new(490));
        assert!(query::enemy_view(&world).into_vec().is_empty());
    }

    #[test]
    fn base_exhaustion_ends_the_session() {
        let mut events = Vec::new();
        let mut world = World::new();
        apply(
            &mut world,
            Command::ConfigureSession {
                play_area: PlayArea::new(300.0, 1_100.0, 600.0),
                base_health: Health::new(10),
            },
            &mut events,
        );
        apply(&mut world, Command::StartSession { seed: 5 }, &mut events);
        let total = query::trail(&world).total_length();

        apply(
            &mut world,
            Command::SpawnEnemy {
                health: Health::new(100),
                speed: total,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(2),
            },
            &mut events,
        );

        assert_eq!(query::session_phase(&world), SessionPhase::GameOver);
        assert_eq!(events.last(), Some(&Event::BaseDestroyed { score: 0 }));

        // Terminal phase: further ticks and spawns leave the world unchanged.
        let elapsed = query::elapsed(&world);
        let before = events.len();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnEnemy {
                health: Health::new(100),
                speed: 1.0,
            },
            &mut events,
        );
        assert_eq!(events.len(), before);
        assert_eq!(query::elapsed(&world), elapsed);

        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Light,
                position: Position::new(400.0, 300.0),
            },
            &mut events,
        );
        assert_eq!(
            events.last(),
            Some(&Event::TowerPlacementRejected {
                kind: TowerKind::Light,
                position: Position::new(400.0, 300.0),
                reason: PlacementError::SessionOver,
            })
        );
    }

    #[test]
    fn firing_at_a_missing_enemy_is_a_no_op() {
        let mut events = Vec::new();
        let mut world = start_world(&mut events);

        let start = query::trail(&world).start();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Light,
                position: start,
            },
            &mut events,
        );
        let tower = match events.last() {
            Some(Event::TowerPlaced { tower, .. }) => *tower,
            other => panic!("expected placement event, got {other:?}"),
        };

        let before = events.len();
        apply(
            &mut world,
            Command::FireProjectile {
                tower,
                enemy: EnemyId::new(99),
            },
            &mut events,
        );
        assert_eq!(events.len(), before);

        // The unfired shot keeps the tower ready.
        let cooldowns = query::tower_cooldown_view(&world).into_vec();
        assert!(cooldowns[0].ready_in.is_zero());
    }

    #[test]
    fn kills_award_score_and_remove_the_enemy() {
        let mut events = Vec::new();
        let mut world = start_world(&mut events);

        let start = query::trail(&world).start();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Light,
                position: start,
            },
            &mut events,
        );
        let tower = match events.last() {
            Some(Event::TowerPlaced { tower, .. }) => *tower,
            other => panic!("expected placement event, got {other:?}"),
        };
        let enemy = spawn_stationary(&mut world, 25, &mut events);

        apply(
            &mut world,
            Command::FireProjectile { tower, enemy },
            &mut events,
        );
        assert_eq!(query::score(&world), 1);
        assert!(query::enemy_view(&world).into_vec().is_empty());
        assert_eq!(events.last(), Some(&Event::EnemyKilled { enemy, score: 1 }));

        // Cooldown spent; a second shot in the same tick is ignored.
        let enemy = spawn_stationary(&mut world, 25, &mut events);
        let before = events.len();
        apply(
            &mut world,
            Command::FireProjectile { tower, enemy },
            &mut events,
        );
        assert_eq!(events.len(), before);
    }
}
