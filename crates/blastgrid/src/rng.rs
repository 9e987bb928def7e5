//! Seeded random number generation.
//!
//! All randomness in the simulation (AI direction picks, bonus drops, boss
//! attack choice, missile scatter) goes through one [`DeterministicRng`] owned
//! by the [`GameContext`](crate::context::GameContext). Two worlds built with
//! the same seed and fed the same deltas evolve identically.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic RNG (ChaCha8, seeded).
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Uniform integer in `[low, high]`.
    pub fn range_inclusive(&mut self, low: i32, high: i32) -> i32 {
        self.rng.gen_range(low..=high)
    }

    /// Uniform float in `[low, high)`. Returns `low` for an empty range.
    pub fn range_f32(&mut self, low: f32, high: f32) -> f32 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..high)
    }

    /// `true` with probability `p` (clamped to `[0, 1]`).
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }

    /// A random element of `items`, or `None` if empty.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}
