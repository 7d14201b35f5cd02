//! Plane geometry for edge re-projection.

use crate::classify::NonStretchBudget;
use kurbo::{Affine, Point, Vec2};
use serde::Serialize;

/// Direction of `from → to` in degrees, measured like `atan2(dy, dx)`.
pub fn angle_deg(from: Point, to: Point) -> f64 {
    (to - from).atan2().to_degrees()
}

/// Rotation component of an affine transform, in degrees.
pub fn rotation_deg(affine: Affine) -> f64 {
    let [a, b, ..] = affine.as_coeffs();
    b.atan2(a).to_degrees()
}

/// Scale applied to the stretchable extent of an edge.
///
/// Returns `None` when the layout-time stretchable extent `d0 - fixed` is
/// not larger than `epsilon`, or when the ratio is not finite. Negative
/// ratios (a node dragged inside the fixed margin) clamp to zero.
pub fn stretch_factor(d0: f64, d1: f64, fixed: f64, epsilon: f64) -> Option<f64> {
    let denominator = d0 - fixed;
    if denominator <= epsilon {
        return None;
    }
    let s = (d1 - fixed) / denominator;
    s.is_finite().then(|| s.max(0.0))
}

/// The scalar quantities derived for one re-projected edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeFrame {
    /// Old direction, moved node → other node, in degrees.
    pub a0: f64,
    /// New direction, in degrees.
    pub a1: f64,
    /// Layout-time distance between the endpoints.
    pub d0: f64,
    /// Current distance between the endpoints.
    pub d1: f64,
    /// Stretch applied to eligible fragments.
    pub scale: f64,
    /// Fixed extents in effect for this edge.
    pub budget: NonStretchBudget,
}

impl EdgeFrame {
    /// Rotation of the edge since layout, in degrees.
    pub fn rotation_delta(&self) -> f64 {
        self.a1 - self.a0
    }
}

/// Pivot pair and fixed-margin offset a fragment is re-projected around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pivot {
    pub old: Point,
    pub new: Point,
    /// Signed distance along the edge's local x-axis where stretching starts.
    pub offset: f64,
}

/// Matrix taking a fragment from its layout-time pose to the current one.
///
/// Undoes the old orientation around `pivot.old`, stretches the local x-axis
/// by `sx` about `pivot.offset`, then applies the new orientation and moves
/// the pivot to `pivot.new`.
pub fn fragment_matrix(pivot: Pivot, a0: f64, a1: f64, sx: f64) -> Affine {
    Affine::translate(pivot.new.to_vec2())
        * Affine::rotate(a1.to_radians())
        * Affine::translate(Vec2::new(pivot.offset, 0.0))
        * Affine::scale_non_uniform(sx, 1.0)
        * Affine::translate(Vec2::new(-pivot.offset, 0.0))
        * Affine::rotate((-a0).to_radians())
        * Affine::translate(-pivot.old.to_vec2())
}
