//! `mas-sim` — per-step orchestration and trial scheduling.
//!
//! # Crate layout
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`observer`]    | `SimObserver` hooks and the per-sample payloads       |
//! | [`planner_sim`] | `PlannerSim` — the cooperative discrete regime        |
//! | [`reactive_sim`]| `ReactiveSim` — the local reactive regime             |
//! | [`error`]       | `SimError`, `SimResult`                               |
//!
//! # Determinism contract
//!
//! Every pass iterates agents in ascending id order and passes are never
//! interleaved: in the discrete regime all plan updates (and therefore all
//! reservation writes) happen before any motion update of the same tick; in
//! the reactive regime the sensing pass reads an index snapshot taken at the
//! start of the step. With the `parallel` feature the sensing pass runs on a
//! thread pool but remains observationally identical, because agents own
//! their RNGs and write only their own fields.

pub mod error;
pub mod observer;
pub mod planner_sim;
pub mod reactive_sim;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, PlannerSample, ReactiveSample, SimObserver};
pub use planner_sim::PlannerSim;
pub use reactive_sim::ReactiveSim;
