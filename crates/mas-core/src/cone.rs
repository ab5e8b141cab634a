//! The forward vision-cone containment test shared by both control regimes.

use crate::geom::{normalize, Pose};

/// Result of a cone-containment test.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConeHit {
    pub in_cone: bool,
    /// Planar distance from observer to candidate, valid either way.
    pub dist: f64,
}

/// Is `candidate` inside the observer's forward cone?
///
/// The cone originates at `observer`, is centered on its heading, has radius
/// `range` and full opening `full_angle`. Both bounds are strict, so a
/// candidate exactly on the rim or on the cone edge is *outside*.
///
/// Callers in periodic arenas must map `candidate` to its nearest periodic
/// image first (see [`nearest_periodic`][crate::geom::nearest_periodic]).
pub fn in_vision_cone(observer: Pose, candidate: Pose, range: f64, full_angle: f64) -> ConeHit {
    let dx = candidate.x - observer.x;
    let dy = candidate.y - observer.y;

    // angle of the separation vector, measured from the observer's heading
    let gamma = dy.atan2(dx);
    let off_center = normalize(gamma - observer.a).abs();

    let dist = dy.hypot(dx);
    ConeHit {
        in_cone: dist < range && off_center < full_angle / 2.0,
        dist,
    }
}
