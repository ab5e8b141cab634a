//! Unit tests for the grid and the neighbor indexes.

#[cfg(test)]
mod grid {
    use crate::SpaceGrid;
    use mas_core::SiteId;

    #[test]
    fn cell_bounds_and_centers() {
        // 10 cells over [-5, 5] → width 1
        let grid = SpaceGrid::new(5.0, 10, false, false);
        assert_eq!(grid.cell_width, 1.0);

        let cell = grid.cell(SiteId::new(0, 0));
        assert_eq!((cell.xmin, cell.ymin), (-5.0, -5.0));
        assert_eq!((cell.x, cell.y), (-4.5, -4.5));

        let cell = grid.cell(SiteId::new(9, 3));
        assert_eq!((cell.xmax, cell.ymin), (5.0, -2.0));
        assert!(cell.is_outer);
        assert!(!grid.cell(SiteId::new(5, 5)).is_outer);
    }

    #[test]
    fn four_connected_neighbor_counts() {
        let grid = SpaceGrid::new(5.0, 10, false, false);
        assert_eq!(grid.neighbors(SiteId::new(5, 5)).len(), 4);
        assert_eq!(grid.neighbors(SiteId::new(0, 5)).len(), 3);
        assert_eq!(grid.neighbors(SiteId::new(0, 0)).len(), 2);
        assert_eq!(grid.neighbors_and_me(SiteId::new(5, 5)).len(), 5);
    }

    #[test]
    fn eight_connected_neighbor_counts() {
        let grid = SpaceGrid::new(5.0, 10, false, true);
        assert_eq!(grid.neighbors(SiteId::new(5, 5)).len(), 8);
        assert_eq!(grid.neighbors(SiteId::new(0, 5)).len(), 5);
        assert_eq!(grid.neighbors(SiteId::new(0, 0)).len(), 3);
    }

    #[test]
    fn periodic_grid_has_uniform_degree() {
        let grid = SpaceGrid::new(5.0, 10, true, true);
        for idx in 0..10 {
            for idy in 0..10 {
                assert_eq!(grid.neighbors(SiteId::new(idx, idy)).len(), 8);
            }
        }
        // the wrapped link exists in both directions
        assert!(grid.neighbors(SiteId::new(0, 4)).contains(&SiteId::new(9, 4)));
        assert!(grid.neighbors(SiteId::new(9, 4)).contains(&SiteId::new(0, 4)));
    }

    #[test]
    fn step_off_grid_stays_put_when_bounded() {
        let grid = SpaceGrid::new(5.0, 10, false, false);
        let pos = SiteId::new(9, 9);
        assert_eq!(grid.apply_step(pos, SiteId::new(1, 0)), pos);
        assert_eq!(grid.apply_step(pos, SiteId::new(0, -1)), SiteId::new(9, 8));
    }

    #[test]
    fn step_off_grid_wraps_when_periodic() {
        let grid = SpaceGrid::new(5.0, 10, true, false);
        assert_eq!(
            grid.apply_step(SiteId::new(9, 0), SiteId::new(1, -1)),
            SiteId::new(0, 9)
        );
    }

    #[test]
    fn wrapped_toward_picks_the_short_way() {
        let grid = SpaceGrid::new(5.0, 10, true, false);
        let near = grid.wrapped_toward(SiteId::new(0, 0), SiteId::new(9, 0));
        assert_eq!(near, SiteId::new(-1, 0));
        // within half the block, unchanged
        let near = grid.wrapped_toward(SiteId::new(0, 0), SiteId::new(4, 4));
        assert_eq!(near, SiteId::new(4, 4));
    }
}

#[cfg(test)]
mod indexes {
    use crate::{CellIndex, IndexEntry, NeighborIndex, SortedIndex};
    use mas_core::{AgentId, Pose, SimParams};

    fn entry(id: u32, x: f64, y: f64) -> IndexEntry {
        IndexEntry { id: AgentId(id), pose: Pose::new(x, y, 0.0, 0.0) }
    }

    fn params() -> SimParams {
        SimParams {
            cells_range: 10.0,
            cells_per_side: 10,
            sensing_range: 2.0,
            sensing_angle: std::f64::consts::PI * 2.0,
            r_upper: 10.0,
            periodic: false,
            ..SimParams::default()
        }
        .validated()
    }

    #[test]
    fn cell_list_finds_same_and_adjacent_cells() {
        let p = params(); // cell width 2
        let mut cells = CellIndex::new(&p);
        cells.populate(&[
            entry(0, 0.5, 0.5),
            entry(1, 1.5, 0.5),  // same cell
            entry(2, 2.5, 0.5),  // adjacent cell
            entry(3, 8.5, 8.5),  // far corner
        ]);

        let ids: Vec<u32> = cells
            .nearby(Pose::new(0.5, 0.5, 0.0, 0.0))
            .iter()
            .map(|e| e.id.0)
            .collect();
        assert!(ids.contains(&0) && ids.contains(&1) && ids.contains(&2));
        assert!(!ids.contains(&3));
    }

    #[test]
    fn cell_list_routes_out_of_range_to_overflow() {
        let p = params();
        let mut cells = CellIndex::new(&p);
        // 50 is outside the ±10 covered square; an observer on the boundary
        // cells still finds it through the overflow link.
        cells.populate(&[entry(0, 50.0, 50.0), entry(1, 9.5, 9.5)]);

        let ids: Vec<u32> = cells
            .nearby(Pose::new(9.5, 9.5, 0.0, 0.0))
            .iter()
            .map(|e| e.id.0)
            .collect();
        assert!(ids.contains(&0), "overflow occupant not visible from outer cell");
    }

    #[test]
    fn sorted_box_query() {
        let mut sorted = SortedIndex::new();
        sorted.refresh(&[
            entry(0, 0.0, 0.0),
            entry(1, 1.0, 1.0),
            entry(2, 3.0, 0.0), // outside x window
            entry(3, 0.0, 3.0), // outside y window
        ]);

        let mut ids: Vec<u32> = sorted
            .nearby(Pose::new(0.0, 0.0, 0.0, 0.0), 2.0)
            .iter()
            .map(|e| e.id.0)
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn sorted_orders_coordinate_ties_by_id() {
        let mut sorted = SortedIndex::new();
        sorted.refresh(&[entry(2, 1.0, 0.0), entry(0, 1.0, 1.0), entry(1, 1.0, 2.0)]);
        let hits = sorted.nearby(Pose::new(1.0, 1.0, 0.0, 0.0), 5.0);
        assert_eq!(hits.len(), 3);
    }

    /// The two strategies must sense identical neighbor sets.
    #[test]
    fn strategies_agree() {
        let p = params();
        let entries: Vec<IndexEntry> = (0..40)
            .map(|i| {
                let x = ((i * 7) % 19) as f64 - 9.0;
                let y = ((i * 13) % 19) as f64 - 9.0;
                entry(i, x, y)
            })
            .collect();

        let mut cells = NeighborIndex::CellList(CellIndex::new(&p));
        let mut sorted = NeighborIndex::SortedAxes(SortedIndex::new());
        cells.refresh(&entries);
        sorted.refresh(&entries);

        for e in &entries {
            let mut a: Vec<u32> = cells.sense(e.id, e.pose, &p).iter().map(|h| h.id.0).collect();
            let mut b: Vec<u32> = sorted.sense(e.id, e.pose, &p).iter().map(|h| h.id.0).collect();
            a.sort_unstable();
            b.sort_unstable();
            assert_eq!(a, b, "strategies disagree for {}", e.id);
        }
    }

    #[test]
    fn sense_filters_self_and_respects_cone() {
        let mut p = params();
        p.sensing_angle = std::f64::consts::PI; // forward half-plane
        let mut index = NeighborIndex::CellList(CellIndex::new(&p));
        // observer at origin facing +x
        index.refresh(&[
            entry(0, 0.0, 0.0),
            entry(1, 1.0, 0.0),  // ahead
            entry(2, -1.0, 0.0), // behind
        ]);

        let hits = index.sense(AgentId(0), Pose::new(0.0, 0.0, 0.0, 0.0), &p);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, AgentId(1));
        assert!((hits[0].dist - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sense_uses_nearest_periodic_image() {
        let mut p = params();
        p.periodic = true;
        p.r_upper = 10.0;
        p.cells_range = 10.0;
        p.sensing_angle = std::f64::consts::PI * 2.0;
        let p = p.validated();

        let mut index = NeighborIndex::CellList(CellIndex::new(&p));
        // 9.5 and -9.5 are 1 apart across the seam
        index.refresh(&[entry(0, 9.5, 0.0), entry(1, -9.5, 0.0)]);

        let hits = index.sense(AgentId(0), Pose::new(9.5, 0.0, 0.0, 0.0), &p);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].dist - 1.0).abs() < 1e-9);
    }
}
