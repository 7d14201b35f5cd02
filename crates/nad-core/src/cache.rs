//! Per-view geometry cache.
//!
//! Holds the per-edge scalars that only depend on layout-time geometry and
//! the transform handles written by the engine. One cache belongs to one
//! diagram view; it lives as long as the loaded diagram and is cleared on
//! reload. Nothing here is global.

use crate::classify::NonStretchBudget;
use crate::config::EngineConfig;
use crate::error::GeometryError;
use crate::id::{DiagramId, FragmentId};
use crate::model::{Diagram, Edge, EdgeKind};
use kurbo::{Affine, Vec2};
use std::collections::HashMap;

/// What a transform handle is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// A drawing fragment of an edge.
    Part(DiagramId),
    /// A text label (translation only).
    Label(DiagramId),
    /// The rotation-only handle of a boundary pseudo-node, separate from
    /// whatever translates that node.
    BoundaryRotation(DiagramId),
}

impl Target {
    pub fn id(&self) -> DiagramId {
        match self {
            Target::Part(id) | Target::Label(id) | Target::BoundaryRotation(id) => *id,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Target::Part(_) => "part",
            Target::Label(_) => "label",
            Target::BoundaryRotation(_) => "rotation",
        }
    }
}

/// A mutable 2D affine transform owned by the cache, one per target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformHandle {
    target: Target,
    matrix: Affine,
}

impl TransformHandle {
    fn new(target: Target) -> Self {
        Self {
            target,
            matrix: Affine::IDENTITY,
        }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn matrix(&self) -> Affine {
        self.matrix
    }

    pub fn set_matrix(&mut self, matrix: Affine) {
        self.matrix = matrix;
    }

    pub fn set_translate(&mut self, offset: Vec2) {
        self.matrix = Affine::translate(offset);
    }

    pub fn translation(&self) -> Vec2 {
        self.matrix.translation()
    }
}

/// Layout-time scalars of one edge, computed on first use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometrySnapshot {
    /// Distance between the two endpoints' layout positions.
    pub initial_distance: f64,
    pub non_stretch: NonStretchBudget,
}

#[derive(Debug, Default)]
pub struct GeometryCache {
    snapshots: HashMap<DiagramId, GeometrySnapshot>,
    handles: Vec<TransformHandle>,
    handle_index: HashMap<Target, FragmentId>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Memoized layout-time geometry for `edge`.
    ///
    /// The first call reads the endpoints' original positions and sums the
    /// fixed extents of the edge's parts. Later calls return the stored value
    /// untouched, whatever happened to the model since.
    ///
    /// # Errors
    /// `MissingEndpoint` if either end is not a node of `diagram`. Failures
    /// are not cached.
    pub fn distance_budget(
        &mut self,
        diagram: &Diagram,
        edge: &Edge,
        config: &EngineConfig,
    ) -> Result<GeometrySnapshot, GeometryError> {
        if let Some(snapshot) = self.snapshots.get(&edge.id) {
            return Ok(*snapshot);
        }
        let snapshot = compute_snapshot(diagram, edge, config)?;
        log::trace!(
            "edge {}: d0 = {:.3}, non-stretch = {:?}",
            edge.id,
            snapshot.initial_distance,
            snapshot.non_stretch
        );
        self.snapshots.insert(edge.id, snapshot);
        Ok(snapshot)
    }

    /// The handle for `target`, allocating an identity handle on first use.
    pub fn handle_for(&mut self, target: Target) -> FragmentId {
        if let Some(id) = self.handle_index.get(&target) {
            return *id;
        }
        let id = FragmentId(self.handles.len() as u32);
        self.handles.push(TransformHandle::new(target));
        self.handle_index.insert(target, id);
        id
    }

    /// Mutable access to the handle for `target`, allocating it if needed.
    pub fn handle_mut_for(&mut self, target: Target) -> &mut TransformHandle {
        let id = self.handle_for(target);
        &mut self.handles[id.index()]
    }

    pub fn lookup(&self, target: Target) -> Option<FragmentId> {
        self.handle_index.get(&target).copied()
    }

    pub fn handle(&self, id: FragmentId) -> Option<&TransformHandle> {
        self.handles.get(id.index())
    }

    /// Current matrix of `target`, if a handle was ever allocated for it.
    pub fn matrix_of(&self, target: Target) -> Option<Affine> {
        self.lookup(target)
            .and_then(|id| self.handle(id))
            .map(TransformHandle::matrix)
    }

    pub fn handles(&self) -> impl Iterator<Item = &TransformHandle> {
        self.handles.iter()
    }

    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    /// Forget everything. Previously returned `FragmentId`s become invalid.
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.handles.clear();
        self.handle_index.clear();
    }
}

fn compute_snapshot(
    diagram: &Diagram,
    edge: &Edge,
    config: &EngineConfig,
) -> Result<GeometrySnapshot, GeometryError> {
    let endpoint = |node: DiagramId| {
        diagram
            .node(node)
            .map(|n| n.original())
            .ok_or(GeometryError::MissingEndpoint {
                edge: edge.id,
                node,
            })
    };
    let p = endpoint(edge.node1)?;
    let q = endpoint(edge.node2)?;

    let mut budget = NonStretchBudget::default();
    for part in &edge.parts {
        if let Some(slot) = part.role.budget_slot() {
            budget.charge(slot, part.length);
        }
    }

    let initial_distance = p.distance(q);

    // The device body of a three-winding center keeps a constant footprint,
    // never longer than what the rest of the leg leaves at layout time.
    if let EdgeKind::ThreeTerminalMember { center } = edge.kind {
        if let Some(side) = edge.side_of(center) {
            let room = (initial_distance - budget.total() + budget.side(side)).max(0.0);
            let margin = budget.side_mut(side);
            *margin = margin.max(config.three_terminal_margin.min(room));
        }
    }

    Ok(GeometrySnapshot {
        initial_distance,
        non_stretch: budget,
    })
}
