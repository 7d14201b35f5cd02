//! Diagram model: nodes, edges and their drawing parts.
//!
//! Built once from `DiagramMetadata`. Topology never changes afterwards;
//! only node current positions do. Nodes and resolvable edges live in an
//! undirected `petgraph` graph (parallel edges and self-loops included).
//! Edges naming a node that is not in the metadata are kept aside so the
//! engine can still translate them when their known end is dragged.

use crate::classify::{EdgeClass, EdgeSide, FragmentRole};
use crate::error::LoadError;
use crate::id::DiagramId;
use crate::metadata::{DiagramMetadata, EdgeMetadata, NodeKindMetadata, Position, PositionSummary};
use kurbo::Point;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableUnGraph;
use petgraph::visit::EdgeRef;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

// ─── Nodes ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Voltage level or bus node.
    VoltageLevel,
    /// Symbolic far end of a dangling line.
    Boundary,
    /// Shared center of a three-winding device.
    ThreeWindingCenter,
}

impl From<NodeKindMetadata> for NodeKind {
    fn from(kind: NodeKindMetadata) -> Self {
        match kind {
            NodeKindMetadata::VoltageLevel => NodeKind::VoltageLevel,
            NodeKindMetadata::Boundary => NodeKind::Boundary,
            NodeKindMetadata::ThreeWindingCenter => NodeKind::ThreeWindingCenter,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: DiagramId,
    pub equipment_id: String,
    pub kind: NodeKind,
    /// Text labels that translate with this node.
    pub labels: SmallVec<[DiagramId; 2]>,
    /// Current position, updated as the node is dragged.
    pub position: Point,
    /// Layout-time position. Captured at load and never changed.
    original: Point,
}

impl Node {
    pub fn new(id: DiagramId, equipment_id: impl Into<String>, kind: NodeKind, at: Point) -> Self {
        Self {
            id,
            equipment_id: equipment_id.into(),
            kind,
            labels: SmallVec::from_buf([id.with_suffix("textnode"), id.with_suffix("textedge")]),
            position: at,
            original: at,
        }
    }

    pub fn original(&self) -> Point {
        self.original
    }
}

// ─── Edges ───────────────────────────────────────────────────────────────

/// Edge kind, with the pseudo-node it relates to already resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Ordinary,
    /// Line to a boundary pseudo-node that rotates with the edge.
    DanglingLine { boundary: DiagramId },
    /// One of three edges radiating from a three-winding center node.
    ThreeTerminalMember { center: DiagramId },
}

/// A drawing fragment belonging to exactly one edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePart {
    pub id: DiagramId,
    pub role: FragmentRole,
    /// Extent along the edge axis, charged to the non-stretch budget when
    /// the part is a fixed glued decoration.
    pub length: f64,
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub id: DiagramId,
    pub node1: DiagramId,
    pub node2: DiagramId,
    pub kind: EdgeKind,
    pub parts: SmallVec<[EdgePart; 4]>,
    /// Text labels attached to the edge itself.
    pub labels: SmallVec<[DiagramId; 2]>,
}

impl Edge {
    pub fn new(id: DiagramId, node1: DiagramId, node2: DiagramId) -> Self {
        Self {
            id,
            node1,
            node2,
            kind: EdgeKind::Ordinary,
            parts: SmallVec::new(),
            labels: SmallVec::new(),
        }
    }

    pub fn is_loop(&self) -> bool {
        self.node1 == self.node2
    }

    /// Which literal end `node` is, if any. A loop answers `One`.
    pub fn side_of(&self, node: DiagramId) -> Option<EdgeSide> {
        if node == self.node1 {
            Some(EdgeSide::One)
        } else if node == self.node2 {
            Some(EdgeSide::Two)
        } else {
            None
        }
    }

    pub fn node_at(&self, side: EdgeSide) -> DiagramId {
        match side {
            EdgeSide::One => self.node1,
            EdgeSide::Two => self.node2,
        }
    }

    /// The endpoint that is not `node`.
    pub fn other_end(&self, node: DiagramId) -> Option<DiagramId> {
        self.side_of(node).map(|side| self.node_at(side.opposite()))
    }
}

// ─── Diagram ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeSlot {
    Graph(EdgeIndex),
    Orphan(usize),
}

/// Read-only snapshot of a loaded diagram plus the nodes' current positions.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    /// Node topology. Edge weights are the full edge records.
    pub graph: StableUnGraph<Node, Edge>,

    /// Edges with at least one endpoint missing from the node list.
    orphans: Vec<Edge>,

    /// Index from node id → graph index.
    id_index: HashMap<DiagramId, NodeIndex>,

    /// Index from edge id → storage slot.
    edge_index: HashMap<DiagramId, EdgeSlot>,

    /// Index from part id → owning edge id.
    part_owner: HashMap<DiagramId, DiagramId>,
}

impl Diagram {
    /// Create an empty diagram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a diagram from parsed metadata.
    ///
    /// # Errors
    /// Fails on duplicate node, edge or part ids.
    pub fn from_metadata(meta: &DiagramMetadata) -> Result<Self, LoadError> {
        let mut diagram = Diagram::new();

        for nm in &meta.nodes {
            let id = DiagramId::intern(&nm.diagram_id);
            let mut node = Node::new(id, nm.equipment_id.clone(), nm.kind.into(), Point::new(nm.x, nm.y));
            if let Some(labels) = &nm.labels {
                node.labels = labels.iter().map(|l| DiagramId::intern(l)).collect();
            }
            diagram.add_node(node)?;
        }

        for em in &meta.edges {
            let edge = diagram.edge_from_metadata(em);
            diagram.add_edge(edge)?;
        }

        log::debug!(
            "loaded diagram: {} nodes, {} edges ({} with missing endpoints)",
            diagram.graph.node_count(),
            diagram.edge_index.len(),
            diagram.orphans.len()
        );
        Ok(diagram)
    }

    /// Parse metadata JSON and build the diagram.
    ///
    /// # Errors
    /// Fails on malformed JSON or duplicate ids.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let meta = DiagramMetadata::from_json(json)?;
        Self::from_metadata(&meta)
    }

    fn edge_from_metadata(&self, em: &EdgeMetadata) -> Edge {
        let mut edge = Edge::new(
            DiagramId::intern(&em.diagram_id),
            DiagramId::intern(&em.node1),
            DiagramId::intern(&em.node2),
        );

        edge.kind = match EdgeClass::from_markers(em.markers.iter().map(String::as_str)) {
            EdgeClass::Ordinary => EdgeKind::Ordinary,
            EdgeClass::DanglingLine => {
                let boundary = em
                    .boundary_node
                    .as_deref()
                    .map(DiagramId::intern)
                    .unwrap_or_else(|| self.endpoint_of_kind(&edge, NodeKind::Boundary));
                EdgeKind::DanglingLine { boundary }
            }
            EdgeClass::ThreeTerminalMember => EdgeKind::ThreeTerminalMember {
                center: self.endpoint_of_kind(&edge, NodeKind::ThreeWindingCenter),
            },
        };

        edge.parts = em
            .parts
            .iter()
            .map(|pm| EdgePart {
                id: pm
                    .id
                    .as_deref()
                    .map(DiagramId::intern)
                    .unwrap_or_else(DiagramId::anonymous),
                role: FragmentRole::from_markers(pm.markers.iter().map(String::as_str)),
                length: pm.length,
            })
            .collect();
        edge.labels = em.labels.iter().map(|l| DiagramId::intern(l)).collect();
        edge
    }

    /// The endpoint with the given kind, falling back to `node2`.
    fn endpoint_of_kind(&self, edge: &Edge, kind: NodeKind) -> DiagramId {
        [edge.node1, edge.node2]
            .into_iter()
            .find(|id| self.node(*id).is_some_and(|n| n.kind == kind))
            .unwrap_or(edge.node2)
    }

    /// Add a node.
    ///
    /// # Errors
    /// Fails if a node with the same id already exists.
    pub fn add_node(&mut self, node: Node) -> Result<NodeIndex, LoadError> {
        let id = node.id;
        if self.id_index.contains_key(&id) {
            return Err(LoadError::DuplicateNode(id));
        }
        let idx = self.graph.add_node(node);
        self.id_index.insert(id, idx);
        Ok(idx)
    }

    /// Add an edge. Edges whose endpoints are not both known are kept aside.
    ///
    /// # Errors
    /// Fails if an edge with the same id already exists, or if one of its
    /// part ids is already taken. Nothing is inserted on failure.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), LoadError> {
        let id = edge.id;
        if self.edge_index.contains_key(&id) {
            return Err(LoadError::DuplicateEdge(id));
        }
        let mut seen: HashMap<DiagramId, DiagramId> = HashMap::with_capacity(edge.parts.len());
        for part in &edge.parts {
            let owner = self.part_owner.get(&part.id).or_else(|| seen.get(&part.id));
            if let Some(&owner) = owner {
                return Err(LoadError::DuplicatePart {
                    part: part.id,
                    edge: id,
                    owner,
                });
            }
            seen.insert(part.id, id);
        }
        self.part_owner.extend(seen);
        let slot = match (self.index_of(edge.node1), self.index_of(edge.node2)) {
            (Some(a), Some(b)) => EdgeSlot::Graph(self.graph.add_edge(a, b, edge)),
            _ => {
                log::warn!(
                    "edge {} references unknown node ({} / {})",
                    edge.id,
                    edge.node1,
                    edge.node2
                );
                self.orphans.push(edge);
                EdgeSlot::Orphan(self.orphans.len() - 1)
            }
        };
        self.edge_index.insert(id, slot);
        Ok(())
    }

    /// Get the graph index for a node id.
    pub fn index_of(&self, id: DiagramId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    /// Look up a node by id.
    pub fn node(&self, id: DiagramId) -> Option<&Node> {
        self.index_of(id).map(|idx| &self.graph[idx])
    }

    pub fn node_mut(&mut self, id: DiagramId) -> Option<&mut Node> {
        self.index_of(id).map(|idx| &mut self.graph[idx])
    }

    /// Look up an edge by id.
    pub fn edge(&self, id: DiagramId) -> Option<&Edge> {
        match self.edge_index.get(&id)? {
            EdgeSlot::Graph(e) => self.graph.edge_weight(*e),
            EdgeSlot::Orphan(i) => self.orphans.get(*i),
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph
            .edge_indices()
            .map(|e| &self.graph[e])
            .chain(self.orphans.iter())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_index.len()
    }

    /// All edges touching `node`, each once (self-loops included once),
    /// in insertion order.
    pub fn edges_of(&self, node: DiagramId) -> Vec<&Edge> {
        let Some(idx) = self.index_of(node) else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        let mut found: Vec<(EdgeIndex, &Edge)> = self
            .graph
            .edges(idx)
            .filter(|e| seen.insert(e.id()))
            .map(|e| (e.id(), e.weight()))
            .collect();
        found.sort_by_key(|(e, _)| *e);

        let mut edges: Vec<&Edge> = found.into_iter().map(|(_, edge)| edge).collect();
        edges.extend(self.orphans.iter().filter(|e| e.side_of(node).is_some()));
        edges
    }

    /// Move a node's current position. Returns false for unknown ids.
    pub fn set_position(&mut self, id: DiagramId, at: Point) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.position = at;
                true
            }
            None => false,
        }
    }

    /// Equipment id → current position for every node.
    pub fn position_summary(&self) -> PositionSummary {
        PositionSummary(
            self.nodes()
                .map(|n| (n.equipment_id.clone(), Position::from(n.position)))
                .collect(),
        )
    }
}
