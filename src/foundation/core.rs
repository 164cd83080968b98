use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::foundation::error::{ArtificeError, ArtificeResult};
use crate::foundation::math::mix64;

pub use kurbo::Point;

/// Stable identifier of a node instance.
///
/// Ids are assigned once at construction and never reassigned. Ordering is lexical, which is
/// the tie-break used for deterministic execution order.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(String);

static ID_SEED: OnceLock<u64> = OnceLock::new();
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

impl NodeId {
    /// Generate a fresh 12 hex digit id.
    pub fn generate() -> Self {
        let seed = *ID_SEED.get_or_init(|| {
            let nanos = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0);
            mix64(nanos ^ u64::from(std::process::id()))
        });
        let n = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        let raw = mix64(seed.wrapping_add(n.wrapping_mul(0x9E37_79B9_7F4A_7C15)));
        Self(format!("{:012x}", raw & 0xFFFF_FFFF_FFFF))
    }

    /// Wrap an existing id, e.g. one restored from a document.
    pub fn new(raw: impl Into<String>) -> ArtificeResult<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ArtificeError::schema("node id must not be empty"));
        }
        Ok(Self(raw))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&NodeId> for String {
    fn from(id: &NodeId) -> Self {
        id.0.clone()
    }
}

/// Reference to a named port on a node, resolved through the owning graph.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortRef {
    /// Owning node.
    pub node: NodeId,
    /// Port name, unique within its direction on the node.
    pub port: String,
}

impl PortRef {
    /// Build a port reference.
    pub fn new(node: NodeId, port: impl Into<String>) -> Self {
        Self {
            node,
            port: port.into(),
        }
    }
}

impl std::fmt::Display for PortRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.node, self.port)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
