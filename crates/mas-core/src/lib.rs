//! `mas-core` — foundational types for the `mas` multi-agent simulation
//! framework.
//!
//! This crate is a dependency of every other `mas-*` crate. It intentionally
//! has no `mas-*` dependencies and minimal external ones (only `rand` and
//! `rand_distr`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module     | Contents                                                |
//! |------------|---------------------------------------------------------|
//! | [`ids`]    | `AgentId`                                               |
//! | [`geom`]   | `normalize`, `Pose`, `nearest_periodic`                 |
//! | [`site`]   | `SiteId` — integer grid coordinates                     |
//! | [`cone`]   | `in_vision_cone`, `ConeHit`                             |
//! | [`rng`]    | `AgentRng` (per-agent), `SimRng` (per-simulation)       |
//! | [`config`] | `SimParams` — the full configuration record             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                               |
//! |---------|------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.  |

pub mod cone;
pub mod config;
pub mod geom;
pub mod ids;
pub mod rng;
pub mod site;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cone::{in_vision_cone, ConeHit};
pub use config::SimParams;
pub use geom::{nearest_periodic, normalize, Pose};
pub use ids::AgentId;
pub use rng::{AgentRng, SimRng};
pub use site::SiteId;
