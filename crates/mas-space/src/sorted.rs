//! Sorted-axes neighbor index: one vector of position snapshots ordered by
//! x and one ordered by y.
//!
//! A box query takes the window `[x − r, x + r]` from the x-sorted vector,
//! the window `[y − r, y + r]` from the y-sorted vector, and intersects the
//! two candidate sets. Ties on a coordinate are broken by agent id so the
//! orders are total.

use rustc_hash::FxHashSet;

use mas_core::Pose;

use crate::index::IndexEntry;

/// Sorted-by-x / sorted-by-y neighbor index.
#[derive(Default)]
pub struct SortedIndex {
    by_x: Vec<IndexEntry>,
    by_y: Vec<IndexEntry>,
}

impl SortedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace both vectors with a freshly sorted snapshot.
    pub fn refresh(&mut self, entries: &[IndexEntry]) {
        self.by_x.clear();
        self.by_x.extend_from_slice(entries);
        self.by_x
            .sort_by(|a, b| a.pose.x.total_cmp(&b.pose.x).then(a.id.cmp(&b.id)));

        self.by_y.clear();
        self.by_y.extend_from_slice(entries);
        self.by_y
            .sort_by(|a, b| a.pose.y.total_cmp(&b.pose.y).then(a.id.cmp(&b.id)));
    }

    /// Entries inside the box `[x − r, x + r] × [y − r, y + r]`.
    pub fn nearby(&self, pose: Pose, range: f64) -> Vec<IndexEntry> {
        let lo = self.by_x.partition_point(|e| e.pose.x < pose.x - range);
        let hi = self.by_x.partition_point(|e| e.pose.x <= pose.x + range);
        let in_x: FxHashSet<u32> = self.by_x[lo..hi].iter().map(|e| e.id.0).collect();

        let lo = self.by_y.partition_point(|e| e.pose.y < pose.y - range);
        let hi = self.by_y.partition_point(|e| e.pose.y <= pose.y + range);
        self.by_y[lo..hi]
            .iter()
            .filter(|e| in_x.contains(&e.id.0))
            .copied()
            .collect()
    }
}
