#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn commands.

use std::time::Duration;

use trail_defence_core::{Command, SessionPhase, ENEMY_SPAWN_HEALTH};

/// Pure system that converts elapsed time into spawn commands.
///
/// The accumulator carries fractional intervals across frames, so a large
/// delta emits one command per whole interval and banks the remainder.
#[derive(Debug, Default)]
pub struct Spawning {
    accumulator: Duration,
}

impl Spawning {
    /// Creates a new spawning system with an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the frame delta and emits spawn commands at the given cadence.
    ///
    /// `interval` and `speed` reflect the difficulty's progression curve for
    /// the current score, so the caller resolves both before each frame. A
    /// non-running phase drains nothing and resets the accumulator.
    pub fn handle(
        &mut self,
        dt: Duration,
        phase: SessionPhase,
        interval: Duration,
        speed: f32,
        out: &mut Vec<Command>,
    ) {
        if phase != SessionPhase::Running {
            self.accumulator = Duration::ZERO;
            return;
        }

        if interval.is_zero() || dt.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        let spawn_attempts = self.resolve_spawn_attempts(interval);

        for _ in 0..spawn_attempts {
            out.push(Command::SpawnEnemy {
                health: ENEMY_SPAWN_HEALTH,
                speed,
            });
        }
    }

    fn resolve_spawn_attempts(&mut self, interval: Duration) -> usize {
        if interval.is_zero() {
            return 0;
        }

        let mut attempts = 0;
        while self.accumulator >= interval {
            self.accumulator -= interval;
            attempts += 1;
        }
        attempts
    }
}
