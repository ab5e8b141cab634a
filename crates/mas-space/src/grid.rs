//! The N×N discretization of the arena used by the cooperative planner.
//!
//! Cells are linked into a 4- or 8-neighbor graph at construction. In a
//! periodic arena, links that would leave the N×N block wrap modulo N;
//! otherwise they are omitted, so edge cells simply have fewer neighbors.

use mas_core::{Pose, SimRng, SiteId};

// ── SpaceUnit ─────────────────────────────────────────────────────────────────

/// One square cell of the discretized arena.
#[derive(Clone, Debug)]
pub struct SpaceUnit {
    pub id: SiteId,
    /// Center coordinates.
    pub x: f64,
    pub y: f64,
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    /// On the outer boundary of the arena square.
    pub is_outer: bool,
    pub neighbors: Vec<SiteId>,
    /// `neighbors` plus this cell itself — the successor set for a planner
    /// that may also wait in place.
    pub neighbors_and_me: Vec<SiteId>,
}

// ── SpaceGrid ─────────────────────────────────────────────────────────────────

/// Square arena of `cells_per_side²` cells, half-size `half_size`.
///
/// Cell `(i, j)` spans `[-R + i·w, -R + (i+1)·w] × [-R + j·w, -R + (j+1)·w]`
/// where `w = 2R / N`.
pub struct SpaceGrid {
    pub cells_per_side: i32,
    pub half_size: f64,
    pub cell_width: f64,
    pub periodic: bool,
    pub diagonals: bool,
    cells: Vec<SpaceUnit>,
}

impl SpaceGrid {
    pub fn new(half_size: f64, cells_per_side: usize, periodic: bool, diagonals: bool) -> Self {
        let n = cells_per_side as i32;
        let w = 2.0 * half_size / cells_per_side as f64;

        let mut cells = Vec::with_capacity(cells_per_side * cells_per_side);
        for idx in 0..n {
            for idy in 0..n {
                let xmin = -half_size + idx as f64 * w;
                let ymin = -half_size + idy as f64 * w;
                cells.push(SpaceUnit {
                    id: SiteId::new(idx, idy),
                    x: xmin + w / 2.0,
                    y: ymin + w / 2.0,
                    xmin,
                    xmax: xmin + w,
                    ymin,
                    ymax: ymin + w,
                    is_outer: idx == 0 || idy == 0 || idx == n - 1 || idy == n - 1,
                    neighbors: Vec::new(),
                    neighbors_and_me: Vec::new(),
                });
            }
        }

        let mut grid = Self {
            cells_per_side: n,
            half_size,
            cell_width: w,
            periodic,
            diagonals,
            cells,
        };
        grid.link_neighbors();
        grid
    }

    /// Each cell initiates the link to its right, upper, and (with diagonals)
    /// two upper-diagonal neighbors; links are added in both directions, so
    /// every undirected edge is created exactly once.
    fn link_neighbors(&mut self) {
        let n = self.cells_per_side;
        for idx in 0..n {
            for idy in 0..n {
                self.link(idx, idy, idx + 1, idy);
                self.link(idx, idy, idx, idy + 1);
                if self.diagonals {
                    self.link(idx, idy, idx + 1, idy + 1);
                    self.link(idx, idy, idx - 1, idy + 1);
                }
            }
        }

        for cell in &mut self.cells {
            cell.neighbors_and_me = cell.neighbors.clone();
            cell.neighbors_and_me.push(cell.id);
        }
    }

    fn link(&mut self, idx: i32, idy: i32, nbr_idx: i32, nbr_idy: i32) {
        let n = self.cells_per_side;
        let out_of_block = nbr_idx < 0 || nbr_idx >= n || nbr_idy < 0 || nbr_idy >= n;
        if out_of_block && !self.periodic {
            return;
        }
        let nbr = SiteId::new(nbr_idx.rem_euclid(n), nbr_idy.rem_euclid(n));
        let here = SiteId::new(idx, idy);
        let (a, b) = (self.slot(here), self.slot(nbr));
        self.cells[a].neighbors.push(nbr);
        self.cells[b].neighbors.push(here);
    }

    #[inline]
    fn slot(&self, site: SiteId) -> usize {
        (site.idx * self.cells_per_side + site.idy) as usize
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    #[inline]
    pub fn contains(&self, site: SiteId) -> bool {
        (0..self.cells_per_side).contains(&site.idx)
            && (0..self.cells_per_side).contains(&site.idy)
    }

    #[inline]
    pub fn cell(&self, site: SiteId) -> &SpaceUnit {
        &self.cells[self.slot(site)]
    }

    #[inline]
    pub fn neighbors(&self, site: SiteId) -> &[SiteId] {
        &self.cell(site).neighbors
    }

    #[inline]
    pub fn neighbors_and_me(&self, site: SiteId) -> &[SiteId] {
        &self.cell(site).neighbors_and_me
    }

    /// Continuous pose of a cell's center (heading zero).
    pub fn center_pose(&self, site: SiteId) -> Pose {
        let cell = self.cell(site);
        Pose::new(cell.x, cell.y, 0.0, 0.0)
    }

    // ── Motion helpers ────────────────────────────────────────────────────

    /// Apply a step delta, enforcing the boundary rule: wrap modulo N in a
    /// periodic arena, stay put if the step would land off-grid otherwise.
    pub fn apply_step(&self, pos: SiteId, step: SiteId) -> SiteId {
        let next = pos + step;
        if self.contains(next) {
            next
        } else if self.periodic {
            let n = self.cells_per_side;
            SiteId::new(next.idx.rem_euclid(n), next.idy.rem_euclid(n))
        } else {
            pos
        }
    }

    /// Integer nearest-image: the representative of `to` (shifted by
    /// multiples of N per axis) closest to `from`. Identity when the arena
    /// is not periodic.
    pub fn wrapped_toward(&self, from: SiteId, to: SiteId) -> SiteId {
        if !self.periodic {
            return to;
        }
        let n = self.cells_per_side;
        let shift = |d: i32| -> i32 {
            if 2 * d.abs() > n {
                if d >= 0 { -n } else { n }
            } else {
                0
            }
        };
        let dx = to.idx - from.idx;
        let dy = to.idy - from.idy;
        SiteId::new(to.idx + shift(dx), to.idy + shift(dy))
    }

    /// Uniform random cell.
    pub fn random_site(&self, rng: &mut SimRng) -> SiteId {
        let max = (self.cells_per_side - 1) as i64;
        SiteId::new(rng.unif_int(0, max) as i32, rng.unif_int(0, max) as i32)
    }
}
