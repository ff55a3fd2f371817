#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use trail_defence_core::{
    EnemyId, EnemyView, Position, SessionPhase, TowerId, TowerTarget, TowerView,
};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    tower_workspace: Vec<TowerWorkspace>,
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// Each tower selects the in-range enemy with the greatest trail
    /// progress; ties fall to the smaller squared distance from the tower,
    /// then to the smaller enemy identifier. The output buffer is cleared
    /// before populating it with the latest assignments.
    pub fn handle(
        &mut self,
        phase: SessionPhase,
        towers: &TowerView,
        enemies: &EnemyView,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if phase != SessionPhase::Running {
            return;
        }

        if towers.iter().next().is_none() || enemies.iter().next().is_none() {
            return;
        }

        self.prepare_tower_workspace(towers);
        self.prepare_enemy_workspace(enemies);

        for tower in &self.tower_workspace {
            let max_distance = tower.range * tower.range;
            let mut best: Option<BestCandidate> = None;

            for candidate in &self.enemy_workspace {
                let distance_sq = tower.position.distance_squared(candidate.position);
                if distance_sq > max_distance {
                    continue;
                }

                let current = BestCandidate {
                    progress: candidate.progress,
                    distance_sq,
                    enemy: candidate.id,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best_candidate) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: best_candidate.enemy,
                });
            }
        }
    }

    fn prepare_tower_workspace(&mut self, towers: &TowerView) {
        self.tower_workspace.clear();
        let (lower, _) = towers.iter().size_hint();
        self.tower_workspace.reserve(lower);

        for snapshot in towers.iter() {
            self.tower_workspace.push(TowerWorkspace {
                id: snapshot.id,
                position: snapshot.position,
                range: snapshot.kind.range(),
            });
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        let (lower, _) = enemies.iter().size_hint();
        self.enemy_workspace.reserve(lower);

        for snapshot in enemies.iter() {
            self.enemy_workspace.push(EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
                progress: snapshot.progress,
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerWorkspace {
    id: TowerId,
    position: Position,
    range: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: Position,
    progress: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    progress: f32,
    distance_sq: f32,
    enemy: EnemyId,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.progress != other.progress {
            return self.progress > other.progress;
        }

        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }

        self.enemy < other.enemy
    }
}

#[cfg(test)]
mod tests {
    use super::TowerTargeting;
    use trail_defence_core::{
        EnemyId, EnemySnapshot, EnemyView, Health, Position, SessionPhase, TowerId, TowerKind,
        TowerSnapshot, TowerTarget, TowerView,
    };

    fn tower_view(snapshots: Vec<TowerSnapshot>) -> TowerView {
        TowerView::from_snapshots(snapshots)
    }

    fn enemy_view(snapshots: Vec<EnemySnapshot>) -> EnemyView {
        EnemyView::from_snapshots(snapshots)
    }

    fn tower_snapshot(id: u32, kind: TowerKind, position: (f32, f32)) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            kind,
            position: Position::new(position.0, position.1),
        }
    }

    fn enemy_snapshot(id: u32, position: (f32, f32), progress: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            position: Position::new(position.0, position.1),
            progress,
            health: Health::new(100),
            speed: 100.0,
        }
    }

    #[test]
    fn prefers_the_enemy_closest_to_the_base() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(vec![tower_snapshot(1, TowerKind::Light, (400.0, 300.0))]);
        // The nearer enemy has less progress; the farther one is about to
        // reach the base and must win.
        let enemies = enemy_view(vec![
            enemy_snapshot(2, (410.0, 300.0), 50.0),
            enemy_snapshot(3, (500.0, 300.0), 400.0),
        ]);

        let mut out = Vec::new();
        system.handle(SessionPhase::Running, &towers, &enemies, &mut out);

        assert_eq!(
            out,
            vec![TowerTarget {
                tower: TowerId::new(1),
                enemy: EnemyId::new(3),
            }]
        );
    }

    #[test]
    fn enemies_outside_range_are_ignored() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(vec![tower_snapshot(1, TowerKind::Light, (400.0, 300.0))]);
        let enemies = enemy_view(vec![enemy_snapshot(2, (900.0, 300.0), 600.0)]);

        let mut out = Vec::new();
        system.handle(SessionPhase::Running, &towers, &enemies, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn equal_progress_breaks_ties_by_distance() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(vec![tower_snapshot(1, TowerKind::Light, (400.0, 300.0))]);
        let enemies = enemy_view(vec![
            enemy_snapshot(2, (400.0, 400.0), 200.0),
            enemy_snapshot(3, (400.0, 350.0), 200.0),
        ]);

        let mut out = Vec::new();
        system.handle(SessionPhase::Running, &towers, &enemies, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].enemy, EnemyId::new(3));
    }

    #[test]
    fn full_ties_prefer_the_smaller_identifier() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(vec![tower_snapshot(1, TowerKind::Light, (400.0, 300.0))]);
        let enemies = enemy_view(vec![
            enemy_snapshot(9, (450.0, 300.0), 150.0),
            enemy_snapshot(4, (350.0, 300.0), 150.0),
        ]);

        let mut out = Vec::new();
        system.handle(SessionPhase::Running, &towers, &enemies, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].enemy, EnemyId::new(4));
    }

    #[test]
    fn heavy_towers_reach_farther_than_light_towers() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(vec![
            tower_snapshot(1, TowerKind::Light, (400.0, 300.0)),
            tower_snapshot(2, TowerKind::Heavy, (400.0, 300.0)),
        ]);
        let enemies = enemy_view(vec![enemy_snapshot(7, (580.0, 300.0), 300.0)]);

        let mut out = Vec::new();
        system.handle(SessionPhase::Running, &towers, &enemies, &mut out);

        assert_eq!(
            out,
            vec![TowerTarget {
                tower: TowerId::new(2),
                enemy: EnemyId::new(7),
            }]
        );
    }

    #[test]
    fn non_running_phases_clear_output() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(vec![tower_snapshot(1, TowerKind::Light, (400.0, 300.0))]);
        let enemies = enemy_view(vec![enemy_snapshot(2, (410.0, 300.0), 10.0)]);

        let mut out = vec![TowerTarget {
            tower: TowerId::new(99),
            enemy: EnemyId::new(99),
        }];

        system.handle(SessionPhase::Paused, &towers, &enemies, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn empty_collections_produce_no_targets() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(Vec::new());
        let enemies = enemy_view(vec![enemy_snapshot(2, (410.0, 300.0), 10.0)]);

        let mut out = Vec::new();
        system.handle(SessionPhase::Running, &towers, &enemies, &mut out);
        assert!(out.is_empty());

        let towers = tower_view(vec![tower_snapshot(1, TowerKind::Light, (400.0, 300.0))]);
        let enemies = enemy_view(Vec::new());
        system.handle(SessionPhase::Running, &towers, &enemies, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn every_tower_receives_its_own_assignment() {
        let mut system = TowerTargeting::new();
        let towers = tower_view(vec![
            tower_snapshot(1, TowerKind::Light, (400.0, 300.0)),
            tower_snapshot(2, TowerKind::Light, (800.0, 300.0)),
        ]);
        let enemies = enemy_view(vec![
            enemy_snapshot(5, (420.0, 300.0), 120.0),
            enemy_snapshot(6, (780.0, 300.0), 480.0),
        ]);

        let mut out = Vec::new();
        system.handle(SessionPhase::Running, &towers, &enemies, &mut out);

        assert_eq!(
            out,
            vec![
                TowerTarget {
                    tower: TowerId::new(1),
                    enemy: EnemyId::new(5),
                },
                TowerTarget {
                    tower: TowerId::new(2),
                    enemy: EnemyId::new(6),
                },
            ]
        );
    }
}
