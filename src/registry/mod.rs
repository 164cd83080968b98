use std::collections::{BTreeMap, BTreeSet};

use crate::foundation::core::NodeId;
use crate::foundation::error::{ArtificeError, ArtificeResult};
use crate::node::node::{Node, NodeInfo, NodeKind};
use crate::node::parameter::{ParamType, ParamValue};
use crate::node::value::PortType;

/// Constructor stored in the registry.
pub type NodeFactory = fn() -> Box<dyn NodeKind>;

/// Registered node type.
#[derive(Clone, Copy, Debug)]
pub struct NodeDescriptor {
    /// Metadata of the constructed kind.
    pub info: NodeInfo,
    /// Constructor.
    pub factory: NodeFactory,
}

/// Port summary in [`NodeTypeInfo`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PortSummary {
    /// Port name.
    pub name: String,
    /// Data type.
    pub port_type: PortType,
    /// Whether the input must be satisfied (always `false` for outputs).
    pub required: bool,
    /// Description.
    pub description: String,
}

/// Parameter summary in [`NodeTypeInfo`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ParameterSummary {
    /// Parameter name.
    pub name: String,
    /// Type tag.
    pub param_type: ParamType,
    /// Default value.
    pub default: serde_json::Value,
}

/// Detailed description of a registered type, for palettes and `artifice nodes`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct NodeTypeInfo {
    /// Registry key.
    pub type_name: String,
    /// Display name.
    pub name: String,
    /// Category.
    pub category: String,
    /// Description.
    pub description: String,
    /// Icon name.
    pub icon: Option<String>,
    /// Inputs in declaration order.
    pub inputs: Vec<PortSummary>,
    /// Outputs in declaration order.
    pub outputs: Vec<PortSummary>,
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterSummary>,
}

/// Mapping from type name to node constructor.
///
/// Owned explicitly by the application and passed to whatever needs to construct nodes,
/// e.g. [`crate::NodeGraph::from_document`].
#[derive(Clone, Debug, Default)]
pub struct NodeRegistry {
    types: BTreeMap<String, NodeDescriptor>,
}

impl NodeRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated with every built-in node kind.
    pub fn with_builtin_nodes() -> Self {
        let mut registry = Self::new();
        crate::nodes::register_builtin(&mut registry);
        registry
    }

    /// Register `K` under its type name. Re-registering a name overwrites it.
    pub fn register<K: NodeKind + Default + 'static>(&mut self) {
        fn make<K: NodeKind + Default + 'static>() -> Box<dyn NodeKind> {
            Box::new(K::default())
        }
        self.register_factory(make::<K>);
    }

    /// Register a constructor under the type name it reports.
    pub fn register_factory(&mut self, factory: NodeFactory) {
        let info = factory().info();
        if self.types.contains_key(info.type_name) {
            tracing::debug!(type_name = info.type_name, "overwriting registered node type");
        }
        self.types
            .insert(info.type_name.to_string(), NodeDescriptor { info, factory });
    }

    /// Make `alias` construct the same kind as `target`.
    pub fn register_alias(&mut self, alias: &str, target: &str) -> ArtificeResult<()> {
        let desc = *self
            .types
            .get(target)
            .ok_or_else(|| ArtificeError::unknown_node_type(target))?;
        self.types.insert(alias.to_string(), desc);
        Ok(())
    }

    /// Descriptor by type name.
    pub fn get(&self, name: &str) -> Option<&NodeDescriptor> {
        self.types.get(name)
    }

    /// `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Construct a node with a fresh id.
    pub fn create(&self, name: &str) -> Option<Node> {
        self.get(name).map(|d| Node::new((d.factory)()))
    }

    /// Construct a node with a known id; unknown names are an error.
    pub fn create_with_id(&self, name: &str, id: NodeId) -> ArtificeResult<Node> {
        let desc = self
            .get(name)
            .ok_or_else(|| ArtificeError::unknown_node_type(name))?;
        Ok(Node::with_id((desc.factory)(), id))
    }

    /// Registered names, aliases included, in lexical order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Distinct categories.
    pub fn get_categories(&self) -> BTreeSet<&'static str> {
        self.types.values().map(|d| d.info.category).collect()
    }

    /// Registered names in `category`.
    pub fn types_in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a str> {
        self.types
            .iter()
            .filter(move |(_, d)| d.info.category == category)
            .map(|(name, _)| name.as_str())
    }

    /// Metadata plus port and parameter summaries.
    pub fn get_node_info(&self, name: &str) -> Option<NodeTypeInfo> {
        let desc = self.get(name)?;
        let node = Node::with_id((desc.factory)(), NodeId::new(name).ok()?);
        let ports = node.ports();
        Some(NodeTypeInfo {
            type_name: name.to_string(),
            name: desc.info.name.to_string(),
            category: desc.info.category.to_string(),
            description: desc.info.description.to_string(),
            icon: desc.info.icon.map(str::to_string),
            inputs: ports
                .inputs()
                .iter()
                .map(|p| PortSummary {
                    name: p.name().to_string(),
                    port_type: p.port_type(),
                    required: p.is_required(),
                    description: p.description().to_string(),
                })
                .collect(),
            outputs: ports
                .outputs()
                .iter()
                .map(|p| PortSummary {
                    name: p.name().to_string(),
                    port_type: p.port_type(),
                    required: false,
                    description: p.description().to_string(),
                })
                .collect(),
            parameters: node
                .parameters()
                .iter()
                .map(|p| ParameterSummary {
                    name: p.name().to_string(),
                    param_type: p.param_type(),
                    default: ParamValue::to_json(p.default_value()),
                })
                .collect(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/registry/registry.rs"]
mod tests;
