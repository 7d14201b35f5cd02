//! Input abstraction layer.
//!
//! Normalizes host pointer events into a unified `InputEvent` enum consumed
//! by the drag tool. Coordinates are already in diagram space.

use nad_core::{DiagramId, Point};

/// A normalized input event from any pointing device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed. `target` is the id of the drawing element under the
    /// pointer, if it has one.
    PointerDown {
        x: f64,
        y: f64,
        target: Option<DiagramId>,
    },

    /// Pointer moved.
    PointerMove { x: f64, y: f64 },

    /// Pointer released.
    PointerUp { x: f64, y: f64 },

    /// Pointer left the drawing area. Ends a drag like a release.
    PointerLeave { x: f64, y: f64 },

    /// Drag aborted (Escape, focus loss).
    Cancel,
}

impl InputEvent {
    /// Create a PointerDown from a host event.
    /// (Used when bridging from JS via wasm-bindgen.)
    pub fn from_pointer_down(x: f64, y: f64, target: Option<&str>) -> Self {
        Self::PointerDown {
            x,
            y,
            target: target.map(DiagramId::intern),
        }
    }

    pub fn from_pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove { x, y }
    }

    pub fn from_pointer_up(x: f64, y: f64) -> Self {
        Self::PointerUp { x, y }
    }

    /// Extract position if this is a pointer event.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y }
            | Self::PointerLeave { x, y } => Some(Point::new(*x, *y)),
            Self::Cancel => None,
        }
    }
}
