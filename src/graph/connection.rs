use crate::foundation::core::{NodeId, PortRef};

/// Directed edge from an output port to an input port, addressed by node id and port name.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Connection {
    /// Producing node.
    pub source_node: NodeId,
    /// Output port on `source_node`.
    pub source_port: String,
    /// Consuming node.
    pub dest_node: NodeId,
    /// Input port on `dest_node`.
    pub dest_port: String,
}

impl Connection {
    /// Build a connection value.
    pub fn new(
        source_node: NodeId,
        source_port: impl Into<String>,
        dest_node: NodeId,
        dest_port: impl Into<String>,
    ) -> Self {
        Self {
            source_node,
            source_port: source_port.into(),
            dest_node,
            dest_port: dest_port.into(),
        }
    }

    /// Output endpoint.
    pub fn source(&self) -> PortRef {
        PortRef::new(self.source_node.clone(), self.source_port.clone())
    }

    /// Input endpoint.
    pub fn dest(&self) -> PortRef {
        PortRef::new(self.dest_node.clone(), self.dest_port.clone())
    }

    /// `true` if either endpoint is on `node`.
    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source_node == node || &self.dest_node == node
    }

    /// `true` if the named port on `node` is one of the endpoints.
    pub fn touches_port(&self, node: &NodeId, port: &str) -> bool {
        (&self.source_node == node && self.source_port == port)
            || (&self.dest_node == node && self.dest_port == port)
    }
}

impl std::fmt::Display for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{}",
            self.source_node, self.source_port, self.dest_node, self.dest_port
        )
    }
}
