//! Authoritative tower state management utilities.

use std::collections::BTreeMap;
use std::time::Duration;

use trail_defence_core::{Position, TowerId, TowerKind};

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Center of the tower in play-area coordinates.
    pub(crate) position: Position,
    /// Remaining time until the tower may fire again.
    pub(crate) cooldown: Duration,
}

impl TowerState {
    /// Reports whether the tower's cooldown has fully elapsed.
    pub(crate) fn ready(&self) -> bool {
        self.cooldown.is_zero()
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug, Default)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: u32,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores a new tower and returns its allocated identifier.
    ///
    /// The cooldown starts at zero so a freshly placed tower fires the
    /// moment a target enters its range.
    pub(crate) fn insert(&mut self, kind: TowerKind, position: Position) -> TowerId {
        let id = TowerId::new(self.next_tower_id);
        self.next_tower_id = self.next_tower_id.wrapping_add(1);
        let _ = self.entries.insert(
            id,
            TowerState {
                id,
                kind,
                position,
                cooldown: Duration::ZERO,
            },
        );
        id
    }

    /// Iterates towers in ascending identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    /// Returns the tower's kind when it exists and is ready to fire.
    pub(crate) fn ready_kind(&self, tower: TowerId) -> Option<TowerKind> {
        self.entries
            .get(&tower)
            .filter(|state| state.ready())
            .map(|state| state.kind)
    }

    /// Restarts the tower's cooldown after a shot.
    pub(crate) fn reset_cooldown(&mut self, tower: TowerId) {
        if let Some(state) = self.entries.get_mut(&tower) {
            state.cooldown = state.kind.fire_cooldown();
        }
    }

    /// Advances every tower's cooldown by the elapsed tick duration.
    pub(crate) fn cool_down(&mut self, dt: Duration) {
        for state in self.entries.values_mut() {
            state.cooldown = state.cooldown.saturating_sub(dt);
        }
    }
}
