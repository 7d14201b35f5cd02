//! Wire formats: diagram metadata in, position summary out.
//!
//! Metadata is produced by the diagram builder alongside the rendered
//! drawing and consumed read-only. The summary is handed to whatever
//! persists final positions after a drag.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level metadata document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramMetadata {
    #[serde(default)]
    pub nodes: Vec<NodeMetadata>,
    #[serde(default)]
    pub edges: Vec<EdgeMetadata>,
}

impl DiagramMetadata {
    /// # Errors
    /// Returns the serde error for malformed JSON or wrong field types.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Node kind as spelled in metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKindMetadata {
    #[default]
    VoltageLevel,
    Boundary,
    ThreeWindingCenter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    pub diagram_id: String,
    pub equipment_id: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub kind: NodeKindMetadata,
    /// Text label fragments that follow this node. When absent the
    /// conventional `<id>-textnode` and `<id>-textedge` ids are used.
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeMetadata {
    pub diagram_id: String,
    pub node1: String,
    pub node2: String,
    /// Edge-kind markers: `dangling-line`, `three-terminal-member`.
    #[serde(default)]
    pub markers: Vec<String>,
    #[serde(default)]
    pub boundary_node: Option<String>,
    #[serde(default)]
    pub parts: Vec<PartMetadata>,
    #[serde(default)]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartMetadata {
    #[serde(default)]
    pub id: Option<String>,
    /// Role markers: `stretchable`, `glued-end-1`, `glued-end-2`, `glued-center`.
    #[serde(default)]
    pub markers: Vec<String>,
    /// Extent of the fragment along the edge axis.
    #[serde(default)]
    pub length: f64,
}

// ─── Position summary ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl From<kurbo::Point> for Position {
    fn from(p: kurbo::Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// Equipment id → final position. Serializes as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionSummary(pub BTreeMap<String, Position>);

impl PositionSummary {
    pub fn get(&self, equipment_id: &str) -> Option<Position> {
        self.0.get(equipment_id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// # Errors
    /// Only fails if a coordinate is not representable in JSON (NaN/infinite).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_document() {
        let json = r#"{
            "nodes": [
                { "diagramId": "0", "equipmentId": "VL1", "x": 0, "y": 0 },
                { "diagramId": "1", "equipmentId": "BN1", "x": 10.5, "y": -3, "kind": "boundary" }
            ],
            "edges": [
                { "diagramId": "2", "node1": "0", "node2": "1",
                  "markers": ["dangling-line"],
                  "parts": [ { "markers": ["stretchable"], "length": 4 } ] }
            ]
        }"#;
        let meta = DiagramMetadata::from_json(json).unwrap();
        assert_eq!(meta.nodes.len(), 2);
        assert_eq!(meta.nodes[1].kind, NodeKindMetadata::Boundary);
        assert!(meta.nodes[0].labels.is_none());
        assert_eq!(meta.edges[0].parts[0].id, None);
        assert_eq!(meta.edges[0].parts[0].length, 4.0);
    }

    #[test]
    fn summary_is_flat_object() {
        let mut summary = PositionSummary::default();
        summary
            .0
            .insert("VL1".to_string(), Position { x: 1.5, y: -2.0 });
        assert_eq!(summary.to_json().unwrap(), r#"{"VL1":{"x":1.5,"y":-2.0}}"#);
    }

    #[test]
    fn rejects_missing_coordinates() {
        let json = r#"{ "nodes": [ { "diagramId": "0", "equipmentId": "VL1" } ] }"#;
        assert!(DiagramMetadata::from_json(json).is_err());
    }
}
