#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic trail generation with validate-and-retry sampling.
//!
//! A session seed fully determines the produced trail: waypoint x and y
//! positions are drawn from separate SplitMix64 streams whose seeds derive
//! from the session seed via SHA-256 labels. Candidates that would create
//! zero-length or near-degenerate segments are rejected; after a bounded
//! number of rejections the generator falls back to a deterministic straight
//! line so callers never observe a failure.

use sha2::{Digest, Sha256};
use trail_defence_core::{PlayArea, Position, Trail, RNG_STREAM_TRAIL_X, RNG_STREAM_TRAIL_Y};

const INTERMEDIATE_WAYPOINTS: usize = 5;
const MAX_ATTEMPTS: u32 = 16;

/// Minimum horizontal separation between consecutive waypoints.
const MIN_X_SEPARATION: f32 = 1.0;

/// Generates the trail for a session.
///
/// The first waypoint sits on the area's left edge and the last on its right
/// edge, both at randomized heights; intermediate waypoints are sampled with
/// strictly increasing x. Degenerate areas resolve to the [`fallback`] trail.
#[must_use]
pub fn generate(area: &PlayArea, seed: u64) -> Trail {
    let mut x_rng = SplitMix64::new(derive_stream_seed(seed, RNG_STREAM_TRAIL_X));
    let mut y_rng = SplitMix64::new(derive_stream_seed(seed, RNG_STREAM_TRAIL_Y));

    for _ in 0..MAX_ATTEMPTS {
        let Some(waypoints) = sample_waypoints(area, &mut x_rng, &mut y_rng) else {
            continue;
        };
        if let Some(trail) = Trail::from_waypoints(waypoints) {
            return trail;
        }
    }

    fallback(area)
}

/// Deterministic straight line across the area at mid-height.
///
/// Used when sampling cannot satisfy the separation constraint and as the
/// placeholder trail before a session starts.
#[must_use]
pub fn fallback(area: &PlayArea) -> Trail {
    let mid = area.height() * 0.5;
    let right = if area.max_x() > area.min_x() {
        area.max_x()
    } else {
        area.min_x() + 1.0
    };
    Trail::from_waypoints(vec![
        Position::new(area.min_x(), mid),
        Position::new(right, mid),
    ])
    .expect("straight fallback trail is always valid")
}

fn sample_waypoints(
    area: &PlayArea,
    x_rng: &mut SplitMix64,
    y_rng: &mut SplitMix64,
) -> Option<Vec<Position>> {
    let mut xs = [0.0f32; INTERMEDIATE_WAYPOINTS];
    for x in &mut xs {
        *x = area.min_x() + x_rng.next_unit() as f32 * area.width();
    }
    xs.sort_by(|left, right| left.total_cmp(right));

    let mut previous = area.min_x();
    for x in &xs {
        if *x - previous < MIN_X_SEPARATION {
            return None;
        }
        previous = *x;
    }
    if area.max_x() - previous < MIN_X_SEPARATION {
        return None;
    }

    let mut waypoints = Vec::with_capacity(INTERMEDIATE_WAYPOINTS + 2);
    waypoints.push(Position::new(area.min_x(), sample_height(area, y_rng)));
    for x in xs {
        waypoints.push(Position::new(x, sample_height(area, y_rng)));
    }
    waypoints.push(Position::new(area.max_x(), sample_height(area, y_rng)));
    Some(waypoints)
}

fn sample_height(area: &PlayArea, rng: &mut SplitMix64) -> f32 {
    rng.next_unit() as f32 * area.height()
}

fn derive_stream_seed(seed: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(label.as_bytes());
    let digest = hasher.finalize();
    let bytes: [u8; 8] = digest[0..8].try_into().expect("sha256 digest slice length");
    u64::from_le_bytes(bytes)
}

#[derive(Debug)]
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    fn new(seed: u64) -> Self {
        let seed = if seed == 0 { 0x9e3779b97f4a7c15 } else { seed };
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }

    fn next_unit(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / ((1u64 << 53) as f64);
        let value = self.next_u64() >> 11;
        (value as f64) * SCALE
    }
}
