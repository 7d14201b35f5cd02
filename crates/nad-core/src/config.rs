use serde::{Deserialize, Serialize};

/// Configuration for a diagram view and its re-projection engine.
///
/// Deserializable from the host's JSON; every missing field takes its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Re-project on every pointer move (continuous) instead of only when the
    /// drag ends (deferred). Default: **true**.
    pub update_while_drag: bool,

    /// Stretch every fragment uniformly and ignore fixed decorations.
    /// Default: **false**.
    pub scale_all_parts: bool,

    /// Fixed margin kept on the center side of a three-terminal member edge,
    /// covering the device body even when no decoration is glued there.
    /// Capped at what the leg's other fixed parts leave at layout time.
    pub three_terminal_margin: f64,

    /// `d0 - nonStretch.total` at or below this is treated as degenerate.
    pub degenerate_epsilon: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            update_while_drag: true,
            scale_all_parts: false,
            three_terminal_margin: 20.0,
            degenerate_epsilon: 1e-9,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config object. Unknown keys are ignored.
    ///
    /// # Errors
    /// Returns the serde error if `json` is not an object with valid field types.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
