//! Uniform cell-list index over continuous agent positions.
//!
//! A second grid, independent of the planner's [`SpaceGrid`][crate::SpaceGrid]:
//! it may cover a range larger than the arena (`cells_range > r_upper`) in
//! the non-periodic case, and it carries a sentinel *overflow cell* that
//! collects positions outside the covered square so that out-of-range agents
//! are never lost.

use mas_core::{Pose, SimParams};

use crate::index::IndexEntry;

struct Cell {
    occupants: Vec<IndexEntry>,
    /// Slot indices of neighboring cells (including the overflow slot for
    /// outer cells).
    neighbors: Vec<usize>,
}

/// Cell-list neighbor index.
///
/// `cells[0..n*n]` are the grid cells in column-major order; the final slot
/// is the overflow cell.
pub struct CellIndex {
    cells_per_side: usize,
    cells_range: f64,
    cell_width: f64,
    cells: Vec<Cell>,
}

impl CellIndex {
    pub fn new(params: &SimParams) -> Self {
        let n = params.cells_per_side;
        let mut cells: Vec<Cell> = (0..n * n + 1)
            .map(|_| Cell { occupants: Vec::new(), neighbors: Vec::new() })
            .collect();

        let overflow = n * n;
        let slot = |idx: i64, idy: i64| (idx as usize) * n + idy as usize;

        // Link right, up, and the two upper diagonals, both ways; wrap the
        // out-of-block links modulo n when the arena is periodic, drop them
        // otherwise. Outer cells additionally link to the overflow cell.
        let link = |cells: &mut Vec<Cell>, a: usize, b: usize| {
            cells[a].neighbors.push(b);
            cells[b].neighbors.push(a);
        };
        for idx in 0..n as i64 {
            for idy in 0..n as i64 {
                for (nx, ny) in [(idx + 1, idy), (idx, idy + 1), (idx + 1, idy + 1), (idx - 1, idy + 1)] {
                    let out = nx < 0 || nx >= n as i64 || ny < 0 || ny >= n as i64;
                    if out && !params.periodic {
                        continue;
                    }
                    let wrapped = slot(nx.rem_euclid(n as i64), ny.rem_euclid(n as i64));
                    link(&mut cells, slot(idx, idy), wrapped);
                }
                let outer = idx == 0 || idy == 0 || idx == n as i64 - 1 || idy == n as i64 - 1;
                if outer {
                    link(&mut cells, slot(idx, idy), overflow);
                }
            }
        }

        Self {
            cells_per_side: n,
            cells_range: params.cells_range,
            cell_width: params.cell_width,
            cells,
        }
    }

    /// Slot holding a continuous position; the overflow slot when it lies
    /// outside the covered square.
    fn slot_for(&self, pose: Pose) -> usize {
        let cr = self.cells_range;
        if pose.x < -cr || pose.x >= cr || pose.y < -cr || pose.y >= cr {
            return self.cells.len() - 1;
        }
        let idx = ((pose.x + cr) / self.cell_width) as usize;
        let idy = ((pose.y + cr) / self.cell_width) as usize;
        // guard against the exact-upper-edge float case
        let n = self.cells_per_side;
        idx.min(n - 1) * n + idy.min(n - 1)
    }

    /// Drop all occupancy lists and re-insert every entry.
    pub fn populate(&mut self, entries: &[IndexEntry]) {
        for cell in &mut self.cells {
            cell.occupants.clear();
        }
        for &entry in entries {
            let slot = self.slot_for(entry.pose);
            self.cells[slot].occupants.push(entry);
        }
    }

    /// Occupants of the position's cell and of all its neighbor cells.
    pub fn nearby(&self, pose: Pose) -> Vec<IndexEntry> {
        let cell = &self.cells[self.slot_for(pose)];
        let mut found = cell.occupants.clone();
        for &nbr in &cell.neighbors {
            found.extend_from_slice(&self.cells[nbr].occupants);
        }
        found
    }
}
