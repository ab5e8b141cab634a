//! Observer hooks for data collection.
//!
//! The managers know when a sampling boundary was crossed; what happens with
//! a sample is someone else's business (a CSV logger, a test probe, a
//! progress printer). All methods have default no-op implementations.

use mas_agent::{GridAgent, ReactiveAgent};
use mas_core::SimParams;
use mas_plan::PlannerStats;

/// Everything a discrete-regime sample carries.
pub struct PlannerSample<'a> {
    pub trial: u32,
    pub sim_time: f64,
    pub params: &'a SimParams,
    pub agents: &'a [GridAgent],
    /// Planner call counters, cumulative across trials.
    pub stats: PlannerStats,
    /// Wall-clock milliseconds since the trial started.
    pub runtime_ms: u128,
}

/// Everything a reactive-regime sample carries.
pub struct ReactiveSample<'a> {
    pub trial: u32,
    pub sim_time: f64,
    pub params: &'a SimParams,
    pub agents: &'a [ReactiveAgent],
    /// Total sensing queries issued so far this run.
    pub sensing_calls: u64,
    /// Wall-clock milliseconds since the trial started.
    pub runtime_ms: u128,
}

/// Callbacks invoked by the managers at sampling boundaries and at the end
/// of a run.
pub trait SimObserver {
    fn on_planner_sample(&mut self, _sample: &PlannerSample<'_>) {}
    fn on_reactive_sample(&mut self, _sample: &ReactiveSample<'_>) {}
    /// Called once after `run_trials` finishes all trials.
    fn on_run_end(&mut self) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// Has `t` just crossed a sampling boundary?
///
/// Tolerant on both sides of the boundary: accumulated `dt` sums drift a few
/// ulps either way, and a sample must not be silently skipped for it.
pub(crate) fn at_sample_boundary(t: f64, interval: f64) -> bool {
    if interval <= 0.0 {
        return false;
    }
    let r = t % interval;
    r < 1e-3 || interval - r < 1e-3
}
