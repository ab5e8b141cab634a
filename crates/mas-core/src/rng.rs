//! Deterministic per-agent and simulation-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each agent gets its own independent `SmallRng` seeded by:
//!
//!   seed = trial_seed XOR (agent_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive agent ids uniformly across the seed space.
//! This means:
//!
//! - Agents never share RNG state, so the stream an agent consumes does not
//!   depend on the update order or on what other agents draw.
//! - A parallel sensing pass produces bit-identical results to the
//!   sequential one.
//! - The same seed always reproduces the same trial.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::geom::normalize;
use crate::AgentId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG.
///
/// Created once per agent at construction and owned by the agent, so every
/// draw it makes is local to that agent.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's seed and an agent id.
    pub fn new(seed: u64, agent: AgentId) -> Self {
        AgentRng(SmallRng::seed_from_u64(
            seed ^ (agent.0 as u64).wrapping_mul(MIXING_CONSTANT),
        ))
    }

    /// Uniform draw in `[min, max)`.
    #[inline]
    pub fn unif(&mut self, min: f64, max: f64) -> f64 {
        self.0.gen_range(min..max)
    }

    /// Uniform integer draw in `[min, max]` (inclusive on both ends).
    #[inline]
    pub fn unif_int(&mut self, min: i64, max: i64) -> i64 {
        self.0.gen_range(min..=max)
    }

    /// Normal draw with the given mean and standard deviation.
    ///
    /// A zero deviation returns the mean exactly.
    #[inline]
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        match Normal::new(mean, std_dev) {
            Ok(dist) => dist.sample(&mut self.0),
            // std_dev < 0 only from a broken config; fall back to the mean
            Err(_) => mean,
        }
    }

    /// Uniform heading in `(-π, π]`.
    #[inline]
    pub fn heading(&mut self) -> f64 {
        normalize(self.0.r#gen::<f64>() * 2.0 * std::f64::consts::PI)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn chance(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}

// ── SimRng ────────────────────────────────────────────────────────────────────

/// Simulation-level RNG for operations that are not tied to one agent
/// (start placement, goal sampling in the discrete regime).
///
/// Only used from the single-threaded manager passes.
pub struct SimRng(SmallRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(SmallRng::seed_from_u64(seed))
    }

    #[inline]
    pub fn unif(&mut self, min: f64, max: f64) -> f64 {
        self.0.gen_range(min..max)
    }

    #[inline]
    pub fn unif_int(&mut self, min: i64, max: i64) -> i64 {
        self.0.gen_range(min..=max)
    }

    /// Uniform heading in `(-π, π]`.
    #[inline]
    pub fn heading(&mut self) -> f64 {
        normalize(self.0.r#gen::<f64>() * 2.0 * std::f64::consts::PI)
    }
}
