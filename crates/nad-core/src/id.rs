use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for diagram identifiers.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// An interned identifier for anything addressable in a diagram: nodes,
/// edges, edge parts and text labels.
/// Internally a `Spur` index, so it is 4 bytes and hashes in O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagramId(Spur);

impl DiagramId {
    /// Intern a string as a DiagramId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        DiagramId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &'static str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a synthetic id (`uid-N`) for a fragment that was loaded
    /// without one. The counter is process-wide and never reused.
    pub fn anonymous() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("uid-{n}"))
    }

    /// Id of a conventional companion fragment, e.g. `vl1-textnode`.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self::intern(&format!("{}-{suffix}", self.as_str()))
    }
}

impl fmt::Debug for DiagramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for DiagramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for DiagramId {
    fn from(s: &str) -> Self {
        Self::intern(s)
    }
}

impl Serialize for DiagramId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DiagramId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(DiagramId::intern(&s))
    }
}

/// Index of a transform handle in a `GeometryCache` arena.
///
/// Only meaningful for the cache that allocated it, and only until that
/// cache is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FragmentId(pub(crate) u32);

impl FragmentId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
