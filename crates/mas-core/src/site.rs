//! Integer grid coordinates.

use std::fmt;
use std::ops::{Add, Neg, Sub};

/// The (column, row) indices of one cell of the discretized arena.
///
/// Also used as a step delta between cells, where `(0, 0)` is a wait.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SiteId {
    pub idx: i32,
    pub idy: i32,
}

impl SiteId {
    #[inline]
    pub fn new(idx: i32, idy: i32) -> Self {
        Self { idx, idy }
    }

    /// `true` for the zero delta (a wait step).
    #[inline]
    pub fn is_wait(self) -> bool {
        self.idx == 0 && self.idy == 0
    }

    /// Heading of this step delta: `atan2(idy, idx)`.
    #[inline]
    pub fn angle(self) -> f64 {
        (self.idy as f64).atan2(self.idx as f64)
    }

    /// Manhattan length of this delta. A diagonal step has `l1() == 2`.
    #[inline]
    pub fn l1(self) -> i32 {
        self.idx.abs() + self.idy.abs()
    }
}

impl Add for SiteId {
    type Output = SiteId;
    #[inline]
    fn add(self, rhs: SiteId) -> SiteId {
        SiteId::new(self.idx + rhs.idx, self.idy + rhs.idy)
    }
}

impl Sub for SiteId {
    type Output = SiteId;
    #[inline]
    fn sub(self, rhs: SiteId) -> SiteId {
        SiteId::new(self.idx - rhs.idx, self.idy - rhs.idy)
    }
}

impl Neg for SiteId {
    type Output = SiteId;
    #[inline]
    fn neg(self) -> SiteId {
        SiteId::new(-self.idx, -self.idy)
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.idx, self.idy)
    }
}
