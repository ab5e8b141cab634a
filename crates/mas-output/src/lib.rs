//! `mas-output` — CSV logging for both simulation regimes.
//!
//! Two tabular streams per run, sampled at fixed simulated-time intervals:
//! an *agents file* (one row per agent per sample, plus one row per sensed
//! neighbor while a reactive agent is stopped) and a *trials file* (one row
//! per sample with planner call counters or sensing counters and the
//! wall-clock time since trial start). All floating-point fields are written
//! with precision 2.
//!
//! [`CsvLogger`] implements `mas_sim::SimObserver`, so hooking a run up is:
//!
//! ```rust,ignore
//! let mut logger = CsvLogger::planner(&agents_path, &trials_path)?;
//! sim.run_trials(20, 8000.0, &mut logger);
//! if let Some(e) = logger.take_error() { eprintln!("output error: {e}"); }
//! ```

pub mod csv;
pub mod error;
pub mod row;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use crate::csv::CsvLogger;
pub use error::{OutputError, OutputResult};
pub use row::{PlannerAgentRow, PlannerTrialRow, ReactiveAgentRow, ReactiveTrialRow};
