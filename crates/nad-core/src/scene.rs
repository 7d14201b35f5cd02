use crate::id::DiagramId;
use crate::model::Diagram;
use kurbo::Point;

/// What the engine needs to know about the drawing currently on screen.
pub trait RenderedScene {
    /// Current rendered center of a node. `None` when the node is hidden,
    /// collapsed, or not drawn at all.
    fn node_position(&self, id: DiagramId) -> Option<Point>;

    /// Whether a drawing fragment with this id is present.
    fn contains_fragment(&self, id: DiagramId) -> bool;
}

/// A bare model renders everything it knows about at its current positions.
impl RenderedScene for Diagram {
    fn node_position(&self, id: DiagramId) -> Option<Point> {
        self.node(id).map(|n| n.position)
    }

    fn contains_fragment(&self, _id: DiagramId) -> bool {
        true
    }
}

impl<S: RenderedScene + ?Sized> RenderedScene for &S {
    fn node_position(&self, id: DiagramId) -> Option<Point> {
        (**self).node_position(id)
    }

    fn contains_fragment(&self, id: DiagramId) -> bool {
        (**self).contains_fragment(id)
    }
}
