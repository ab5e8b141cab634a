//! The full simulation configuration record.
//!
//! One plain struct covers both control regimes; each manager reads the
//! fields relevant to it and ignores the rest. Applications typically start
//! from `SimParams::default()` and override per sweep point.

use crate::geom::Pose;
use crate::rng::AgentRng;

/// Agent and simulation parameters.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimParams {
    /// Count of simulated agents.
    pub num_agents: usize,

    /// Arena wraps on both axes (torus).
    pub periodic: bool,
    /// Restrict continuous goal sampling to the ring `r_lower ..= r_upper`.
    pub circle_arena: bool,
    /// Arena half-size: coordinates range over `[-r_upper, r_upper]`.
    pub r_upper: f64,
    /// Inner ring radius for `circle_arena` goal sampling.
    pub r_lower: f64,

    // ── Neighbor search ───────────────────────────────────────────────────
    /// Coordinate range covered by the continuous cell-list index. May
    /// exceed `r_upper` in the non-periodic case.
    pub cells_range: f64,
    /// Cells per side, for both the discrete grid and the cell-list index.
    pub cells_per_side: usize,
    /// Derived: `2 * cells_range / cells_per_side`. Recomputed by
    /// [`validated`][Self::validated].
    pub cell_width: f64,
    pub use_sorted_agents: bool,
    pub use_cell_lists: bool,

    // ── Discrete planner ──────────────────────────────────────────────────
    /// Enable 8-connected grid adjacency.
    pub diags: bool,
    /// Diagonal steps take 1.5 time units and time is discretized at 0.5.
    pub diags_take_longer: bool,
    /// Planner time horizon: nodes at or beyond this time are not expanded.
    pub time_steps: f64,

    // ── Sensing ───────────────────────────────────────────────────────────
    pub sensing_range: f64,
    /// Full cone opening, radians.
    pub sensing_angle: f64,

    // ── Continuous motion ─────────────────────────────────────────────────
    /// Integration step.
    pub dt: f64,
    /// Continuous goal acceptance radius.
    pub goal_tolerance: f64,
    pub cruisespeed: f64,
    /// Turn gain; `-1.0` means instantaneous turning.
    pub turnspeed: f64,

    // ── Noise model ───────────────────────────────────────────────────────
    /// `>= 0`: Normal standard deviation; `-1.0`: Uniform over `(-π, π]`.
    pub anglenoise: f64,
    pub anglebias: f64,
    pub avg_runsteps: u32,
    /// Redraw each run length uniformly from `[avg/2, 3·avg/2]`.
    pub randomize_runsteps: bool,
    /// Probability of applying the noisy heading at a phase start.
    pub noise_prob: f64,
    /// Apply noise only while the agent is blocked.
    pub conditional_noise: bool,

    // ── Logging ───────────────────────────────────────────────────────────
    /// Simulated-time interval between samples; `0.0` disables sampling.
    pub save_data_interval: f64,
    /// Agents-file path; empty to not save data.
    pub outfile_name: String,
    /// Optional label copied into every agents-file row.
    pub addtl_data: String,

    /// Master RNG seed. The same seed always reproduces the same trials.
    pub seed: u64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            num_agents: 16,
            periodic: false,
            circle_arena: false,
            r_upper: 8.0,
            r_lower: 0.0,
            cells_range: 10.0,
            cells_per_side: 20,
            cell_width: 1.0,
            use_sorted_agents: false,
            use_cell_lists: true,
            diags: true,
            diags_take_longer: true,
            time_steps: 800.0,
            sensing_range: 1.5,
            sensing_angle: std::f64::consts::PI * 2.0 / 3.0,
            dt: 0.1,
            goal_tolerance: 0.3,
            cruisespeed: 0.5,
            turnspeed: -1.0,
            anglenoise: 0.0,
            anglebias: 0.0,
            avg_runsteps: 10,
            randomize_runsteps: true,
            noise_prob: 1.0,
            conditional_noise: false,
            save_data_interval: 0.0,
            outfile_name: String::new(),
            addtl_data: String::new(),
            seed: 0,
        }
    }
}

impl SimParams {
    /// Apply the corrected-with-a-diagnostic configuration rules and return
    /// the adjusted record.
    ///
    /// - A periodic cell-list index must cover exactly the arena, so
    ///   `cells_range` is forced to `r_upper`.
    /// - `cell_width` is derived from `cells_range` and `cells_per_side`.
    pub fn validated(mut self) -> Self {
        if self.periodic && self.use_cell_lists && self.cells_range != self.r_upper {
            tracing::warn!(
                cells_range = self.cells_range,
                r_upper = self.r_upper,
                "periodic cell-list index requires cells_range == r_upper; adjusting"
            );
            self.cells_range = self.r_upper;
        }
        self.cell_width = 2.0 * self.cells_range / self.cells_per_side as f64;
        self
    }

    /// Rejection-sample a pose uniformly over the arena (or over the
    /// `r_lower ..= r_upper` ring when `circle_arena` is set), with a
    /// uniform random heading.
    pub fn random_pose(&self, rng: &mut AgentRng) -> Pose {
        let a = rng.heading();
        loop {
            let x = self.r_upper * 2.0 * (rng.unif(0.0, 1.0) - 0.5);
            let y = self.r_upper * 2.0 * (rng.unif(0.0, 1.0) - 0.5);
            let dist = x.hypot(y);
            if !self.circle_arena || (dist <= self.r_upper && dist >= self.r_lower) {
                return Pose::new(x, y, 0.0, a);
            }
        }
    }
}
