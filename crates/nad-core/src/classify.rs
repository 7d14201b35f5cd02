//! Static classification of drawing fragments and edges.
//!
//! Marker strings from the diagram metadata are mapped to enums exactly once,
//! at load time. The transform engine only ever matches on the results.

use serde::{Deserialize, Serialize};

// ─── Marker vocabulary ───────────────────────────────────────────────────

pub const MARKER_STRETCHABLE: &str = "stretchable";
pub const MARKER_GLUED_END_1: &str = "glued-end-1";
pub const MARKER_GLUED_END_2: &str = "glued-end-2";
pub const MARKER_GLUED_CENTER: &str = "glued-center";
pub const MARKER_DANGLING_LINE: &str = "dangling-line";
pub const MARKER_THREE_TERMINAL_MEMBER: &str = "three-terminal-member";

/// Rendered diagrams prefix their class names with `nad-`; both spellings
/// are accepted.
fn normalize(marker: &str) -> &str {
    let marker = marker.trim();
    marker.strip_prefix("nad-").unwrap_or(marker)
}

// ─── Edge ends ───────────────────────────────────────────────────────────

/// One of the two literal ends of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeSide {
    One,
    Two,
}

impl EdgeSide {
    pub fn opposite(self) -> Self {
        match self {
            EdgeSide::One => EdgeSide::Two,
            EdgeSide::Two => EdgeSide::One,
        }
    }
}

/// The structural point a fragment's reference frame is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlueAnchor {
    End1,
    End2,
    Center,
}

impl GlueAnchor {
    /// The edge end this anchor is pinned to, `None` for the midpoint.
    pub fn side(self) -> Option<EdgeSide> {
        match self {
            GlueAnchor::End1 => Some(EdgeSide::One),
            GlueAnchor::End2 => Some(EdgeSide::Two),
            GlueAnchor::Center => None,
        }
    }
}

// ─── Fragment role ───────────────────────────────────────────────────────

/// Where a non-stretchable fragment's extent is charged in the edge's
/// non-stretch budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetSlot {
    Side(EdgeSide),
    Center,
}

/// Role of a drawing fragment within its edge.
///
/// Stretch eligibility and glue anchoring are independent: a half-line can
/// be both stretchable and glued to one end. A fragment with neither is
/// `fixed` and follows the moved node's frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FragmentRole {
    pub stretch: bool,
    pub glue: Option<GlueAnchor>,
}

impl FragmentRole {
    pub const FIXED: FragmentRole = FragmentRole {
        stretch: false,
        glue: None,
    };

    pub const fn new(stretch: bool, glue: Option<GlueAnchor>) -> Self {
        Self { stretch, glue }
    }

    /// Classify a fragment from its marker list. Unknown markers are ignored.
    /// If several glue markers are present the last one wins.
    pub fn from_markers<'a, I>(markers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut role = FragmentRole::FIXED;
        for marker in markers {
            match normalize(marker) {
                MARKER_STRETCHABLE => role.stretch = true,
                MARKER_GLUED_END_1 | "glued-1" => role.glue = Some(GlueAnchor::End1),
                MARKER_GLUED_END_2 | "glued-2" => role.glue = Some(GlueAnchor::End2),
                MARKER_GLUED_CENTER => role.glue = Some(GlueAnchor::Center),
                _ => {}
            }
        }
        role
    }

    pub fn is_fixed(&self) -> bool {
        !self.stretch && self.glue.is_none()
    }

    /// Budget slot for this fragment's extent. Stretchable and unanchored
    /// fragments do not consume the fixed budget.
    pub fn budget_slot(&self) -> Option<BudgetSlot> {
        if self.stretch {
            return None;
        }
        match self.glue? {
            GlueAnchor::End1 => Some(BudgetSlot::Side(EdgeSide::One)),
            GlueAnchor::End2 => Some(BudgetSlot::Side(EdgeSide::Two)),
            GlueAnchor::Center => Some(BudgetSlot::Center),
        }
    }
}

// ─── Edge class ──────────────────────────────────────────────────────────

/// Special edge kinds, before their pseudo-node ids are resolved against
/// the node list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeClass {
    #[default]
    Ordinary,
    DanglingLine,
    ThreeTerminalMember,
}

impl EdgeClass {
    pub fn from_markers<'a, I>(markers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut class = EdgeClass::Ordinary;
        for marker in markers {
            match normalize(marker) {
                MARKER_DANGLING_LINE => class = EdgeClass::DanglingLine,
                MARKER_THREE_TERMINAL_MEMBER | "3wt-edge" => {
                    class = EdgeClass::ThreeTerminalMember;
                }
                _ => {}
            }
        }
        class
    }
}

// ─── Non-stretch budget ──────────────────────────────────────────────────

/// Portion of the inter-node distance consumed by fixed-size decorations,
/// measured from each end inward and around the midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NonStretchBudget {
    pub side1: f64,
    pub side2: f64,
    pub center: f64,
}

impl NonStretchBudget {
    pub fn total(&self) -> f64 {
        self.side1 + self.side2 + self.center
    }

    pub fn side(&self, side: EdgeSide) -> f64 {
        match side {
            EdgeSide::One => self.side1,
            EdgeSide::Two => self.side2,
        }
    }

    pub fn side_mut(&mut self, side: EdgeSide) -> &mut f64 {
        match side {
            EdgeSide::One => &mut self.side1,
            EdgeSide::Two => &mut self.side2,
        }
    }

    /// Charge `length` to the given slot.
    pub fn charge(&mut self, slot: BudgetSlot, length: f64) {
        let length = length.max(0.0);
        match slot {
            BudgetSlot::Side(side) => *self.side_mut(side) += length,
            BudgetSlot::Center => self.center += length,
        }
    }
}
