//! Boundary-node orientation for dangling lines.
//!
//! A boundary node is symbolic: its drawing only needs to point along its
//! line. It gets a rotation-only handle, kept apart from whatever translates
//! the node, so the two compose independently in the renderer.

use crate::cache::{GeometryCache, Target};
use crate::geometry::EdgeFrame;
use crate::id::DiagramId;
use crate::transform::{FragmentTransform, Reprojection};
use kurbo::Affine;

/// Rotate `boundary` by the change in direction of its line.
pub fn propagate_orientation(
    boundary: DiagramId,
    frame: &EdgeFrame,
    cache: &mut GeometryCache,
    out: &mut Reprojection,
) {
    let delta = frame.rotation_delta();
    log::trace!("boundary {boundary}: rotate {delta:.3} deg");
    out.apply(
        cache,
        Target::BoundaryRotation(boundary),
        FragmentTransform::Matrix(Affine::rotate(delta.to_radians())),
    );
}

/// Put `boundary` back to its layout orientation. Used when its line is
/// only translated, so no rotation from an earlier move lingers.
pub fn clear_orientation(boundary: DiagramId, cache: &mut GeometryCache, out: &mut Reprojection) {
    log::trace!("boundary {boundary}: rotation cleared");
    out.apply(
        cache,
        Target::BoundaryRotation(boundary),
        FragmentTransform::Matrix(Affine::IDENTITY),
    );
}
