//! Neighbor-index strategy selection and the shared sensing step.

use mas_core::{in_vision_cone, nearest_periodic, AgentId, Pose, SimParams};

use crate::cells::CellIndex;
use crate::sorted::SortedIndex;

// ── Entries and hits ──────────────────────────────────────────────────────────

/// One agent's position snapshot as stored in a neighbor index.
#[derive(Copy, Clone, Debug)]
pub struct IndexEntry {
    pub id: AgentId,
    pub pose: Pose,
}

/// One sensed neighbor: who, and how far away.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SensorHit {
    pub id: AgentId,
    pub dist: f64,
}

// ── NeighborIndex ─────────────────────────────────────────────────────────────

/// The configured neighbor-search strategy.
///
/// Both strategies answer the same question — "who could be within sensing
/// range of this pose?" — with a superset of the true neighbor set; the cone
/// test in [`sense`][Self::sense] does the exact filtering.
pub enum NeighborIndex {
    CellList(CellIndex),
    SortedAxes(SortedIndex),
}

impl NeighborIndex {
    /// Build the strategy selected by `use_cell_lists` / `use_sorted_agents`.
    /// Cell lists win if both are requested.
    pub fn from_params(params: &SimParams) -> Self {
        if params.use_cell_lists || !params.use_sorted_agents {
            NeighborIndex::CellList(CellIndex::new(params))
        } else {
            NeighborIndex::SortedAxes(SortedIndex::new())
        }
    }

    /// Rebuild the index from a position snapshot.
    pub fn refresh(&mut self, entries: &[IndexEntry]) {
        match self {
            NeighborIndex::CellList(cells) => cells.populate(entries),
            NeighborIndex::SortedAxes(sorted) => sorted.refresh(entries),
        }
    }

    /// Candidate neighbors of `pose` (a superset of the in-range set).
    pub fn nearby(&self, pose: Pose, range: f64) -> Vec<IndexEntry> {
        match self {
            NeighborIndex::CellList(cells) => cells.nearby(pose),
            NeighborIndex::SortedAxes(sorted) => sorted.nearby(pose, range),
        }
    }

    /// Everything the agent `observer` at `pose` sees in its vision cone.
    ///
    /// Candidates are mapped to their nearest periodic image first when the
    /// arena wraps; the observer itself is filtered out by id.
    pub fn sense(&self, observer: AgentId, pose: Pose, params: &SimParams) -> Vec<SensorHit> {
        let mut result = Vec::new();
        for entry in self.nearby(pose, params.sensing_range) {
            if entry.id == observer {
                continue;
            }
            let nbr_pose = if params.periodic {
                nearest_periodic(pose, entry.pose, params.r_upper)
            } else {
                entry.pose
            };
            let hit = in_vision_cone(pose, nbr_pose, params.sensing_range, params.sensing_angle);
            if hit.in_cone {
                result.push(SensorHit { id: entry.id, dist: hit.dist });
            }
        }
        result
    }
}
