use crate::id::DiagramId;

/// Failures met while re-projecting one edge. Every variant is recovered
/// locally by the engine; none aborts a drag.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// The edge references a node that is not in the diagram model.
    #[error("edge {edge} references missing node {node}")]
    MissingEndpoint { edge: DiagramId, node: DiagramId },

    /// A classified fragment could not be located in the rendered scene.
    #[error("fragment {fragment} of edge {edge} is not in the rendered scene")]
    UnresolvedFragment { edge: DiagramId, fragment: DiagramId },

    /// The stretchable extent of the edge was zero at layout time.
    #[error("edge {edge} has no stretchable length at layout time")]
    DegenerateGeometry { edge: DiagramId },
}

/// Failures loading diagram metadata.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to parse diagram metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate node id {0}")]
    DuplicateNode(DiagramId),

    #[error("duplicate edge id {0}")]
    DuplicateEdge(DiagramId),

    /// Each drawing fragment owns exactly one transform handle, so a part id
    /// may appear only once across all edges.
    #[error("part {part} of edge {edge} is already used by edge {owner}")]
    DuplicatePart {
        part: DiagramId,
        edge: DiagramId,
        owner: DiagramId,
    },
}
