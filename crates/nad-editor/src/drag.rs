//! Node drag tool.
//!
//! Turns pointer events into node moves on a `DiagramView`:
//!
//! | Event | Idle | Dragging |
//! |-------|------|----------|
//! | **PointerDown** | grab nearest draggable node | ignored |
//! | **PointerMove** | ignored | re-project (continuous) or remember (deferred) |
//! | **PointerUp / PointerLeave** | ignored | apply final position, back to idle |
//! | **Cancel** | ignored | restore pre-drag position, back to idle |

use crate::input::InputEvent;
use crate::view::DiagramView;
use nad_core::{DiagramId, Point, Reprojection, Vec2};

/// State of an active drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub node: DiagramId,
    /// Pointer position minus node position at grab time.
    grab: Vec2,
    /// Node position when the drag began.
    pub start: Point,
    /// Latest position requested by the pointer.
    pub pending: Point,
}

#[derive(Debug, Default)]
pub struct DragTool {
    session: Option<DragSession>,
}

impl DragTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Handle one input event. Returns the re-projection to apply, if the
    /// event moved anything.
    pub fn handle(&mut self, view: &mut DiagramView, event: &InputEvent) -> Option<Reprojection> {
        match *event {
            InputEvent::PointerDown { x, y, target } => {
                if self.session.is_some() {
                    return None;
                }
                let node = view.scene().draggable_from(target?)?;
                let start = view.node_position(node)?;
                let pointer = Point::new(x, y);
                log::info!("drag start: {node} at ({:.1}, {:.1})", start.x, start.y);
                self.session = Some(DragSession {
                    node,
                    grab: pointer - start,
                    start,
                    pending: start,
                });
                None
            }
            InputEvent::PointerMove { x, y } => {
                let session = self.session.as_mut()?;
                session.pending = Point::new(x, y) - session.grab;
                if view.config().update_while_drag {
                    Some(view.move_node(session.node, session.pending))
                } else {
                    None
                }
            }
            InputEvent::PointerUp { x, y } | InputEvent::PointerLeave { x, y } => {
                let session = self.session.take()?;
                let to = Point::new(x, y) - session.grab;
                log::info!("drag end: {} at ({:.1}, {:.1})", session.node, to.x, to.y);
                Some(view.move_node(session.node, to))
            }
            InputEvent::Cancel => {
                let session = self.session.take()?;
                log::info!("drag cancelled: {}", session.node);
                Some(view.move_node(session.node, session.start))
            }
        }
    }
}
