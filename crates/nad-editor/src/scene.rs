//! Scene index: what the host has actually drawn.
//!
//! Stands between the diagram model and the rendered drawing. Holds an
//! owned parent-pointer table for resolving a clicked element to the node
//! that should be dragged, the set of hidden nodes, and the set of
//! fragments the drawing does not contain.

use nad_core::{Diagram, DiagramId, Point, RenderedScene};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct SceneIndex {
    /// Drawing element → enclosing element.
    parents: HashMap<DiagramId, DiagramId>,
    draggable: HashSet<DiagramId>,
    hidden: HashSet<DiagramId>,
    missing: HashSet<DiagramId>,
}

impl SceneIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index for a freshly rendered diagram: every node is draggable, and
    /// every edge part sits under its edge.
    pub fn from_diagram(diagram: &Diagram) -> Self {
        let mut index = Self::new();
        for node in diagram.nodes() {
            index.draggable.insert(node.id);
        }
        for edge in diagram.edges() {
            for part in &edge.parts {
                index.parents.insert(part.id, edge.id);
            }
        }
        index
    }

    /// Record that `child` is drawn inside `parent`.
    pub fn set_parent(&mut self, child: DiagramId, parent: DiagramId) {
        self.parents.insert(child, parent);
    }

    pub fn parent(&self, id: DiagramId) -> Option<DiagramId> {
        self.parents.get(&id).copied()
    }

    pub fn set_draggable(&mut self, id: DiagramId, draggable: bool) {
        if draggable {
            self.draggable.insert(id);
        } else {
            self.draggable.remove(&id);
        }
    }

    pub fn set_hidden(&mut self, node: DiagramId, hidden: bool) {
        if hidden {
            self.hidden.insert(node);
        } else {
            self.hidden.remove(&node);
        }
    }

    pub fn is_hidden(&self, node: DiagramId) -> bool {
        self.hidden.contains(&node)
    }

    /// Record whether a fragment is absent from the drawing.
    pub fn set_missing(&mut self, fragment: DiagramId, missing: bool) {
        if missing {
            self.missing.insert(fragment);
        } else {
            self.missing.remove(&fragment);
        }
    }

    pub fn is_missing(&self, fragment: DiagramId) -> bool {
        self.missing.contains(&fragment)
    }

    /// Nearest draggable element at or above `id`.
    ///
    /// Walks the parent table upward. Hidden nodes are not draggable. Stops
    /// with `None` at the root or when the chain loops back on itself.
    pub fn draggable_from(&self, id: DiagramId) -> Option<DiagramId> {
        let mut visited: SmallVec<[DiagramId; 8]> = SmallVec::new();
        let mut current = id;
        loop {
            if self.draggable.contains(&current) && !self.hidden.contains(&current) {
                return Some(current);
            }
            if visited.contains(&current) {
                log::debug!("parent chain of {id} loops at {current}");
                return None;
            }
            visited.push(current);
            current = self.parent(current)?;
        }
    }
}

/// A diagram as the host currently shows it.
#[derive(Clone, Copy)]
pub struct ViewScene<'a> {
    diagram: &'a Diagram,
    index: &'a SceneIndex,
}

impl<'a> ViewScene<'a> {
    pub fn new(diagram: &'a Diagram, index: &'a SceneIndex) -> Self {
        Self { diagram, index }
    }
}

impl RenderedScene for ViewScene<'_> {
    fn node_position(&self, id: DiagramId) -> Option<Point> {
        if self.index.is_hidden(id) {
            return None;
        }
        self.diagram.node(id).map(|n| n.position)
    }

    fn contains_fragment(&self, id: DiagramId) -> bool {
        !self.index.is_missing(id)
    }
}
