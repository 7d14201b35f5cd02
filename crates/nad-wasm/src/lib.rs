//! WASM bridge for NAD drag. Exposes the diagram view and drag tool to
//! JavaScript.
//!
//! Compiled via `wasm-pack build --target web` and loaded next to the SVG
//! drawing. Everything crossing the boundary is a JSON string: metadata in,
//! fragment updates and position summaries out.

use nad_core::{DiagramId, EngineConfig, LoadError, Point, Reprojection};
use nad_editor::{DiagramView, DragTool, InputEvent};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// The main WASM-facing diagram controller.
///
/// Holds one diagram view and its drag tool. All interaction from the host
/// page goes through this struct.
#[wasm_bindgen]
pub struct NadView {
    view: DiagramView,
    tool: DragTool,
}

/// Result of a load, as returned to JS.
#[derive(Serialize)]
struct LoadStatus {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl LoadStatus {
    fn from_result(result: Result<(), LoadError>) -> String {
        let status = match result {
            Ok(()) => LoadStatus {
                ok: true,
                error: None,
            },
            Err(e) => LoadStatus {
                ok: false,
                error: Some(e.to_string()),
            },
        };
        serde_json::to_string(&status).unwrap_or_else(|_| r#"{"ok":false}"#.to_string())
    }
}

#[wasm_bindgen]
impl NadView {
    /// Create an empty view. `config_json` may be empty or partial; invalid
    /// config falls back to the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Self {
        // Set up panic hook for better error messages in console
        console_error_panic_hook_setup();

        let config = if config_json.trim().is_empty() {
            EngineConfig::default()
        } else {
            EngineConfig::from_json(config_json).unwrap_or_else(|e| {
                log::warn!("invalid engine config, using defaults: {e}");
                EngineConfig::default()
            })
        };
        Self {
            view: DiagramView::new(Default::default(), config),
            tool: DragTool::new(),
        }
    }

    /// Load (or reload) diagram metadata. Any drag in progress is dropped.
    /// Returns JSON `{"ok":true}` or `{"ok":false,"error":"..."}`.
    pub fn load(&mut self, metadata: &str) -> String {
        self.tool = DragTool::new();
        LoadStatus::from_result(self.view.reload(metadata))
    }

    /// Record that drawing element `child` sits inside `parent`.
    pub fn set_parent(&mut self, child: &str, parent: &str) {
        self.view
            .scene_mut()
            .set_parent(DiagramId::intern(child), DiagramId::intern(parent));
    }

    pub fn set_hidden(&mut self, node: &str, hidden: bool) {
        self.view
            .scene_mut()
            .set_hidden(DiagramId::intern(node), hidden);
    }

    pub fn set_missing(&mut self, fragment: &str, missing: bool) {
        self.view
            .scene_mut()
            .set_missing(DiagramId::intern(fragment), missing);
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    /// Each pointer handler returns the fragment updates to apply as a JSON
    /// array, empty when nothing moved.
    pub fn pointer_down(&mut self, x: f64, y: f64, target: Option<String>) -> String {
        self.dispatch(InputEvent::from_pointer_down(x, y, target.as_deref()))
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> String {
        self.dispatch(InputEvent::from_pointer_move(x, y))
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> String {
        self.dispatch(InputEvent::from_pointer_up(x, y))
    }

    pub fn pointer_leave(&mut self, x: f64, y: f64) -> String {
        self.dispatch(InputEvent::PointerLeave { x, y })
    }

    pub fn cancel(&mut self) -> String {
        self.dispatch(InputEvent::Cancel)
    }

    pub fn is_dragging(&self) -> bool {
        self.tool.is_dragging()
    }

    /// Move a node programmatically, outside any drag.
    pub fn move_node(&mut self, id: &str, x: f64, y: f64) -> String {
        let out = self.view.move_node(DiagramId::intern(id), Point::new(x, y));
        updates_json(Some(out))
    }

    /// Current position of every node as `{ equipmentId: {x, y} }`.
    pub fn positions(&self) -> String {
        self.view
            .positions()
            .to_json()
            .unwrap_or_else(|_| "{}".to_string())
    }
}

impl NadView {
    fn dispatch(&mut self, event: InputEvent) -> String {
        updates_json(self.tool.handle(&mut self.view, &event))
    }
}

fn updates_json(out: Option<Reprojection>) -> String {
    match out {
        Some(out) => out.to_json().unwrap_or_else(|e| {
            log::warn!("could not serialize fragment updates: {e}");
            "[]".to_string()
        }),
        None => "[]".to_string(),
    }
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("NAD WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone validation (no view needed) ──────────────────────────────

/// Validate diagram metadata. Returns JSON: `{"ok":true}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_metadata(metadata: &str) -> String {
    LoadStatus::from_result(nad_core::Diagram::from_json(metadata).map(|_| ()))
}
