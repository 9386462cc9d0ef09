//! The simulation's single deterministic random stream.
//!
//! # Determinism strategy
//!
//! A run owns exactly one [`SimRng`].  It is passed by `&mut` to arrival
//! generation and to every patient advance, so the sequence of draws is a
//! pure function of the seed and the (fixed) order in which the epoch loop
//! visits servers.  Nothing in the workspace reads randomness from ambient
//! global state.
//!
//! Independent runs (replications) derive their seeds with
//! [`SimRng::run_seed`]:
//!
//!   seed = base_seed XOR (run * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive run indices uniformly across the seed space, so
//! runs can execute in parallel without sharing state.

use rand::distributions::Distribution;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Run-level RNG shared by arrival generation and patient outcomes.
///
/// Used only from the single thread that drives the epoch loop.  Parallel
/// replications each build their own `SimRng` from [`SimRng::run_seed`].
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    /// Seed for replication `run` of a batch started from `base_seed`.
    ///
    /// Run 0 uses `base_seed` unchanged.
    #[inline]
    pub fn run_seed(base_seed: u64, run: u32) -> u64 {
        base_seed ^ (run as u64).wrapping_mul(MIXING_CONSTANT)
    }

    /// Draw one value from `dist`.
    #[inline]
    pub fn sample<T, D: Distribution<T>>(&mut self, dist: &D) -> T {
        self.0.sample(dist)
    }

    /// Uniform `f64` in `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}
