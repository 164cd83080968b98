use std::collections::BTreeMap;
use std::path::Path;

use crate::foundation::core::{NodeId, Point};
use crate::foundation::error::{ArtificeError, ArtificeResult};
use crate::graph::connection::Connection;
use crate::graph::graph::NodeGraph;
use crate::node::parameter::{ParamValue, SetOutcome};
use crate::registry::NodeRegistry;

/// Persisted graph: name, nodes and connections.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GraphDocument {
    /// Graph name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Node list.
    pub nodes: Vec<NodeDocument>,
    /// Connection list.
    #[serde(default)]
    pub connections: Vec<ConnectionDocument>,
}

/// Persisted node: registry type tag, id, editor position and parameter values.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeDocument {
    /// Registry key.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Node id.
    pub id: NodeId,
    /// Editor position `[x, y]`.
    #[serde(default)]
    pub position: [f64; 2],
    /// Parameter values by name.
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
}

/// Persisted connection; same shape as [`Connection`].
pub type ConnectionDocument = Connection;

impl GraphDocument {
    /// Parse a document from JSON text.
    pub fn from_json_str(text: &str) -> ArtificeResult<Self> {
        serde_json::from_str(text).map_err(|e| ArtificeError::schema(e.to_string()))
    }

    /// Parse a document from a reader.
    pub fn from_reader(reader: impl std::io::Read) -> ArtificeResult<Self> {
        serde_json::from_reader(reader).map_err(|e| ArtificeError::schema(e.to_string()))
    }

    /// Pretty JSON text.
    pub fn to_json_string(&self) -> ArtificeResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ArtificeError::schema(format!("serialize graph: {e}")))
    }
}

impl NodeGraph {
    /// Persisted form of the graph. Nodes are listed in id order.
    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            name: self.name().map(str::to_string),
            nodes: self.nodes().values().map(|n| n.to_document()).collect(),
            connections: self.get_connections().to_vec(),
        }
    }

    /// Rebuild a graph, constructing nodes through `registry`.
    ///
    /// Parameter values go through the regular coercion path and connections are replayed
    /// through [`NodeGraph::connect`], so a document describing a cycle fails to load.
    /// Parameters the node does not declare, or values it rejects, are skipped with a warning.
    #[tracing::instrument(
        skip_all,
        fields(nodes = doc.nodes.len(), connections = doc.connections.len())
    )]
    pub fn from_document(doc: GraphDocument, registry: &NodeRegistry) -> ArtificeResult<Self> {
        let mut graph = NodeGraph::new();
        graph.set_name(doc.name);

        for nd in doc.nodes {
            let id = NodeId::new(nd.id.as_str())?;
            let mut node = registry.create_with_id(&nd.node_type, id)?;
            node.set_position(Point::new(nd.position[0], nd.position[1]));
            for (name, raw) in &nd.parameters {
                let outcome = match ParamValue::from_json(raw) {
                    Some(value) => node.apply_parameter(name, value),
                    None => Ok(SetOutcome::Rejected),
                };
                match outcome {
                    Ok(SetOutcome::Rejected) => {
                        tracing::warn!(node = %nd.id, param = %name, value = %raw, "rejected");
                    }
                    Ok(_) => {}
                    Err(ArtificeError::ParameterNotFound { .. }) => {
                        tracing::warn!(node = %nd.id, param = %name, "unknown parameter");
                    }
                    Err(e) => return Err(e),
                }
            }
            graph.add_node(node)?;
        }

        for c in &doc.connections {
            graph.connect(&c.source_node, &c.source_port, &c.dest_node, &c.dest_port)?;
        }
        Ok(graph)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> ArtificeResult<String> {
        self.to_document().to_json_string()
    }

    /// Parse a graph from JSON read from `reader`.
    pub fn from_reader(
        reader: impl std::io::Read,
        registry: &NodeRegistry,
    ) -> ArtificeResult<Self> {
        Self::from_document(GraphDocument::from_reader(reader)?, registry)
    }

    /// Write the graph as JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> ArtificeResult<()> {
        let text = self.to_json_string()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ArtificeError::io(format!("create '{}': {e}", parent.display())))?;
        }
        std::fs::write(path, text)
            .map_err(|e| ArtificeError::io(format!("write '{}': {e}", path.display())))
    }

    /// Read a graph from a JSON file.
    pub fn load(path: &Path, registry: &NodeRegistry) -> ArtificeResult<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| ArtificeError::io(format!("open '{}': {e}", path.display())))?;
        Self::from_reader(std::io::BufReader::new(file), registry)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/document.rs"]
mod tests;
