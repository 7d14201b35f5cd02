//! A loaded diagram as shown by one host view.
//!
//! Each view owns its diagram, its scene index, its geometry cache and its
//! config. Two views never share cached geometry or transform handles.

use crate::scene::{SceneIndex, ViewScene};
use nad_core::{
    Diagram, DiagramId, EngineConfig, GeometryCache, LoadError, NodeMove, Point, PositionSummary,
    Reprojection, reproject,
};

pub struct DiagramView {
    diagram: Diagram,
    scene: SceneIndex,
    cache: GeometryCache,
    config: EngineConfig,
}

impl DiagramView {
    pub fn new(diagram: Diagram, config: EngineConfig) -> Self {
        let scene = SceneIndex::from_diagram(&diagram);
        Self {
            diagram,
            scene,
            cache: GeometryCache::new(),
            config,
        }
    }

    /// Load a view from diagram metadata JSON.
    ///
    /// # Errors
    /// Fails on malformed metadata or duplicate ids.
    pub fn from_json(json: &str, config: EngineConfig) -> Result<Self, LoadError> {
        Ok(Self::new(Diagram::from_json(json)?, config))
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn scene(&self) -> &SceneIndex {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneIndex {
        &mut self.scene
    }

    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn node_position(&self, id: DiagramId) -> Option<Point> {
        self.diagram.node(id).map(|n| n.position)
    }

    /// Move a node to `to`, re-project everything attached to it, then
    /// record `to` as the node's current position.
    ///
    /// Transforms are computed from the node's layout position, so the
    /// result only depends on where the node ends up.
    pub fn move_node(&mut self, id: DiagramId, to: Point) -> Reprojection {
        let Some(from) = self.diagram.node(id).map(|n| n.original()) else {
            log::warn!("move of unknown node {id}");
            return Reprojection::default();
        };
        let scene = ViewScene::new(&self.diagram, &self.scene);
        let out = reproject(
            &self.diagram,
            &scene,
            &mut self.cache,
            &self.config,
            NodeMove::new(id, from, to),
        );
        self.diagram.set_position(id, to);
        out
    }

    /// Replace the diagram with a freshly loaded one. The scene index is
    /// rebuilt and all cached geometry and handles are dropped. On error
    /// the current diagram is kept.
    ///
    /// # Errors
    /// Fails on malformed metadata or duplicate ids.
    pub fn reload(&mut self, json: &str) -> Result<(), LoadError> {
        let diagram = Diagram::from_json(json)?;
        self.scene = SceneIndex::from_diagram(&diagram);
        self.diagram = diagram;
        self.cache.clear();
        log::info!(
            "reloaded diagram: {} nodes, {} edges",
            self.diagram.node_count(),
            self.diagram.edge_count()
        );
        Ok(())
    }

    /// Current position of every node, keyed by equipment id.
    pub fn positions(&self) -> PositionSummary {
        self.diagram.position_summary()
    }
}
