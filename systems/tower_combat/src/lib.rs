#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits projectile firing commands from targeting data.

use trail_defence_core::{
    Command, SessionPhase, TowerCooldownSnapshot, TowerCooldownView, TowerId, TowerTarget,
};

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireProjectile` entries for towers ready to fire.
    pub fn handle(
        &mut self,
        phase: SessionPhase,
        tower_cooldowns: TowerCooldownView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if phase != SessionPhase::Running {
            return;
        }

        if tower_targets.is_empty() {
            return;
        }

        let cooldowns = tower_cooldowns.into_vec();
        if cooldowns.is_empty() {
            return;
        }

        self.scratch.clear();

        for target in tower_targets {
            if let Some(snapshot) = find_cooldown(&cooldowns, target.tower) {
                if snapshot.ready_in.is_zero() {
                    self.scratch.push(Command::FireProjectile {
                        tower: target.tower,
                        enemy: target.enemy,
                    });
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn find_cooldown(
    cooldowns: &[TowerCooldownSnapshot],
    tower: TowerId,
) -> Option<&TowerCooldownSnapshot> {
    cooldowns
        .binary_search_by_key(&tower, |snapshot| snapshot.tower)
        .ok()
        .map(|index| &cooldowns[index])
}
