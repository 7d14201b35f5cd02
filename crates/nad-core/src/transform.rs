//! Incremental edge re-projection.
//!
//! Given one node move, derives a transform for every drawing fragment that
//! depends on that node: the parts of each adjacent edge, the node's text
//! labels, and the rotation of any dangling line's boundary node. Results are
//! written into the cache's handles and returned as a `Reprojection` for the
//! renderer to apply.
//!
//! Transforms are absolute with respect to the layout-time drawing, so each
//! event overwrites the previous one. Failures are recovered per edge or per
//! fragment and reported in `Reprojection::recovered`.

use crate::cache::{GeometryCache, Target};
use crate::classify::{EdgeSide, NonStretchBudget};
use crate::config::EngineConfig;
use crate::error::GeometryError;
use crate::geometry::{EdgeFrame, Pivot, angle_deg, fragment_matrix, stretch_factor};
use crate::id::DiagramId;
use crate::model::{Diagram, Edge, EdgeKind, EdgePart};
use crate::orient::{clear_orientation, propagate_orientation};
use crate::scene::RenderedScene;
use kurbo::{Affine, Point, Vec2};
use serde::Serialize;

/// One node moved from `from` to `to`.
///
/// `from` is the node's layout-time position when the result should be
/// absolute (which the drag tool always uses).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeMove {
    pub node: DiagramId,
    pub from: Point,
    pub to: Point,
}

impl NodeMove {
    pub fn new(node: DiagramId, from: Point, to: Point) -> Self {
        Self { node, from, to }
    }

    pub fn delta(&self) -> Vec2 {
        self.to - self.from
    }
}

// ─── Output ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FragmentTransform {
    Matrix(Affine),
    Translate(Vec2),
}

impl FragmentTransform {
    /// The transform as a full matrix.
    pub fn to_affine(self) -> Affine {
        match self {
            FragmentTransform::Matrix(m) => m,
            FragmentTransform::Translate(v) => Affine::translate(v),
        }
    }

    pub fn is_translate(&self) -> bool {
        matches!(self, FragmentTransform::Translate(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentUpdate {
    pub target: Target,
    pub transform: FragmentTransform,
}

/// Everything one move event changed.
#[derive(Debug, Clone, Default)]
pub struct Reprojection {
    /// Fragment updates in the order they were computed.
    pub updates: Vec<FragmentUpdate>,
    /// Scalars of every edge that was rotated and scaled.
    pub frames: Vec<(DiagramId, EdgeFrame)>,
    /// Failures recovered while processing the event.
    pub recovered: Vec<GeometryError>,
}

/// Wire shape of one update: `{ id, target, matrix? | translate? }`.
#[derive(Serialize)]
struct UpdateRecord<'a> {
    id: &'a str,
    target: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    matrix: Option<[f64; 6]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    translate: Option<[f64; 2]>,
}

impl Reprojection {
    pub fn get(&self, target: Target) -> Option<FragmentTransform> {
        self.updates
            .iter()
            .find(|u| u.target == target)
            .map(|u| u.transform)
    }

    pub fn frame(&self, edge: DiagramId) -> Option<&EdgeFrame> {
        self.frames.iter().find(|(id, _)| *id == edge).map(|(_, f)| f)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FragmentUpdate> {
        self.updates.iter()
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Serialize the updates as a JSON array for the renderer.
    ///
    /// # Errors
    /// Fails only on non-finite coefficients.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let records: Vec<UpdateRecord<'_>> = self
            .updates
            .iter()
            .map(|u| {
                let (matrix, translate) = match u.transform {
                    FragmentTransform::Matrix(m) => (Some(m.as_coeffs()), None),
                    FragmentTransform::Translate(v) => (None, Some([v.x, v.y])),
                };
                UpdateRecord {
                    id: u.target.id().as_str(),
                    target: u.target.kind_name(),
                    matrix,
                    translate,
                }
            })
            .collect();
        serde_json::to_string(&records)
    }

    /// Write `transform` into the handle for `target` and record it.
    pub(crate) fn apply(
        &mut self,
        cache: &mut GeometryCache,
        target: Target,
        transform: FragmentTransform,
    ) {
        let handle = cache.handle_mut_for(target);
        match transform {
            FragmentTransform::Matrix(m) => handle.set_matrix(m),
            FragmentTransform::Translate(v) => handle.set_translate(v),
        }
        self.updates.push(FragmentUpdate { target, transform });
    }
}

// ─── Engine ──────────────────────────────────────────────────────────────

/// Re-project everything attached to the moved node.
///
/// Never fails: edges and fragments that cannot be handled exactly degrade
/// to translation, identity scale, or are skipped, and the reason is listed
/// in `recovered`. An unknown node yields an empty result.
pub fn reproject(
    diagram: &Diagram,
    scene: &impl RenderedScene,
    cache: &mut GeometryCache,
    config: &EngineConfig,
    mv: NodeMove,
) -> Reprojection {
    let mut out = Reprojection::default();
    let Some(node) = diagram.node(mv.node) else {
        log::warn!("move of unknown node {}", mv.node);
        return out;
    };

    for edge in diagram.edges_of(mv.node) {
        reproject_edge(diagram, scene, cache, config, mv, edge, &mut out);
    }

    let delta = mv.delta();
    for &label in &node.labels {
        if scene.contains_fragment(label) {
            out.apply(cache, Target::Label(label), FragmentTransform::Translate(delta));
        } else {
            log::trace!("label {label} not rendered");
        }
    }

    out
}

fn reproject_edge(
    diagram: &Diagram,
    scene: &impl RenderedScene,
    cache: &mut GeometryCache,
    config: &EngineConfig,
    mv: NodeMove,
    edge: &Edge,
    out: &mut Reprojection,
) {
    if edge.is_loop() {
        log::trace!("edge {}: loop, translating", edge.id);
        translate_edge(scene, cache, edge, mv.delta(), out);
        return;
    }

    let snapshot = match cache.distance_budget(diagram, edge, config) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            log::debug!("{err}; translating edge only");
            out.recovered.push(err);
            translate_edge(scene, cache, edge, mv.delta(), out);
            return;
        }
    };

    let Some(moved_side) = edge.side_of(mv.node) else {
        return;
    };
    let other = edge.node_at(moved_side.opposite());
    let (Some(q0), Some(q1)) = (
        diagram.node(other).map(|n| n.original()),
        scene.node_position(other),
    ) else {
        log::trace!("edge {}: {other} not rendered, translating", edge.id);
        translate_edge(scene, cache, edge, mv.delta(), out);
        return;
    };

    let (p0, p1) = (mv.from, mv.to);
    let budget = if config.scale_all_parts {
        NonStretchBudget::default()
    } else {
        snapshot.non_stretch
    };
    let d0 = snapshot.initial_distance;
    let d1 = p1.distance(q1);
    let scale = match stretch_factor(d0, d1, budget.total(), config.degenerate_epsilon) {
        Some(s) => s,
        None => {
            let err = GeometryError::DegenerateGeometry { edge: edge.id };
            log::debug!("{err}; scale clamped to 1");
            out.recovered.push(err);
            1.0
        }
    };
    let frame = EdgeFrame {
        a0: angle_deg(p0, q0),
        a1: angle_deg(p1, q1),
        d0,
        d1,
        scale,
        budget,
    };
    log::trace!("edge {}: {frame:?}", edge.id);

    let ends = EdgeEnds {
        moved_side,
        moved: (p0, p1),
        other: (q0, q1),
    };
    for part in &edge.parts {
        if !scene.contains_fragment(part.id) {
            let err = GeometryError::UnresolvedFragment {
                edge: edge.id,
                fragment: part.id,
            };
            log::warn!("{err}");
            out.recovered.push(err);
            continue;
        }
        let pivot = ends.pivot_for(part, &budget);
        let sx = if part.role.stretch || config.scale_all_parts {
            frame.scale
        } else {
            1.0
        };
        let matrix = fragment_matrix(pivot, frame.a0, frame.a1, sx);
        out.apply(cache, Target::Part(part.id), FragmentTransform::Matrix(matrix));
    }

    if let EdgeKind::DanglingLine { boundary } = edge.kind {
        propagate_orientation(boundary, &frame, cache, out);
    }
    out.frames.push((edge.id, frame));
}

/// Old and new positions of both ends, relative to the moved node.
struct EdgeEnds {
    moved_side: EdgeSide,
    moved: (Point, Point),
    other: (Point, Point),
}

impl EdgeEnds {
    /// Glue anchors are literal edge ends: a part glued to the end that did
    /// not move pivots on the other node and measures its margin inward from
    /// there, hence the negative offset.
    fn pivot_for(&self, part: &EdgePart, budget: &NonStretchBudget) -> Pivot {
        let (p0, p1) = self.moved;
        let (q0, q1) = self.other;
        match part.role.glue.map(|anchor| anchor.side()) {
            None => Pivot {
                old: p0,
                new: p1,
                offset: budget.side(self.moved_side),
            },
            Some(None) => Pivot {
                old: p0.midpoint(q0),
                new: p1.midpoint(q1),
                offset: 0.0,
            },
            Some(Some(side)) if side == self.moved_side => Pivot {
                old: p0,
                new: p1,
                offset: budget.side(side),
            },
            Some(Some(side)) => Pivot {
                old: q0,
                new: q1,
                offset: -budget.side(side),
            },
        }
    }
}

/// Translate every present part and label of `edge` by `delta`. A dangling
/// line's boundary goes back to its layout orientation.
fn translate_edge(
    scene: &impl RenderedScene,
    cache: &mut GeometryCache,
    edge: &Edge,
    delta: Vec2,
    out: &mut Reprojection,
) {
    for part in &edge.parts {
        if scene.contains_fragment(part.id) {
            out.apply(cache, Target::Part(part.id), FragmentTransform::Translate(delta));
        } else {
            let err = GeometryError::UnresolvedFragment {
                edge: edge.id,
                fragment: part.id,
            };
            log::warn!("{err}");
            out.recovered.push(err);
        }
    }
    for &label in &edge.labels {
        if scene.contains_fragment(label) {
            out.apply(cache, Target::Label(label), FragmentTransform::Translate(delta));
        }
    }
    if let EdgeKind::DanglingLine { boundary } = edge.kind {
        clear_orientation(boundary, cache, out);
    }
}
