use std::collections::BTreeMap;

use crate::backend::ComputeBackend;
use crate::backend::cpu::CpuBackend;
use crate::foundation::core::{NodeId, PortRef};
use crate::foundation::error::{ArtificeError, ArtificeResult};
use crate::graph::connection::Connection;
use crate::graph::exec::{ExecuteOpts, ExecutionReport};
use crate::graph::topology;
use crate::node::node::Node;
use crate::node::parameter::{ParamValue, SetOutcome};
use crate::node::port::{OutputPort, check_compatible};
use crate::node::value::{PortType, Value};

/// A directed acyclic graph of nodes, executed in dependency order with per-node caching.
///
/// The graph owns its nodes and the connection list. Input ports hold a [`PortRef`] to their
/// single upstream output; output ports hold the set of linked inputs. Both sides are kept
/// in sync with `connections` by every mutating call.
#[derive(Debug, Default)]
pub struct NodeGraph {
    name: Option<String>,
    nodes: BTreeMap<NodeId, Node>,
    connections: Vec<Connection>,
}

impl NodeGraph {
    /// Empty, unnamed graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty graph with a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Graph name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Rename the graph.
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` when the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `true` when a node with `id` exists.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Node by id.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Apply `edit` to a node in place.
    ///
    /// If the node is dirty afterwards (a parameter or input default changed, or
    /// [`Node::mark_dirty`] was called), every node downstream of it is invalidated before
    /// this returns.
    pub fn edit_node<R>(
        &mut self,
        id: &NodeId,
        edit: impl FnOnce(&mut Node) -> R,
    ) -> ArtificeResult<R> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| ArtificeError::node_not_found(id))?;
        let out = edit(node);
        if node.is_dirty() {
            self.mark_dirty_from([id.clone()]);
        }
        Ok(out)
    }

    /// Nodes keyed by id.
    pub fn nodes(&self) -> &BTreeMap<NodeId, Node> {
        &self.nodes
    }

    /// All connections, in creation order.
    pub fn get_connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Connections touching `id` in either direction.
    pub fn connections_of<'a>(
        &'a self,
        id: &'a NodeId,
    ) -> impl Iterator<Item = &'a Connection> {
        self.connections.iter().filter(move |c| c.touches(id))
    }

    /// Remove every node and connection.
    pub fn clear(&mut self) {
        self.connections.clear();
        self.nodes.clear();
    }

    /// Add a node; its id must not already be present.
    pub fn add_node(&mut self, node: Node) -> ArtificeResult<NodeId> {
        let id = node.id().clone();
        if self.nodes.contains_key(&id) {
            return Err(ArtificeError::DuplicateNode(id.to_string()));
        }
        self.nodes.insert(id.clone(), node);
        Ok(id)
    }

    /// Remove a node after severing every connection touching it.
    pub fn remove_node(&mut self, id: &NodeId) -> ArtificeResult<Node> {
        if !self.nodes.contains_key(id) {
            return Err(ArtificeError::node_not_found(id));
        }
        self.disconnect_all(id)?;
        self.nodes
            .remove(id)
            .ok_or_else(|| ArtificeError::node_not_found(id))
    }

    /// Connect `src.src_port` (an output) to `dst.dst_port` (an input).
    ///
    /// An input that is already linked has its previous link replaced. Connecting an
    /// existing edge again is a no-op. The destination and everything downstream of it
    /// becomes dirty.
    pub fn connect(
        &mut self,
        src: &NodeId,
        src_port: &str,
        dst: &NodeId,
        dst_port: &str,
    ) -> ArtificeResult<()> {
        let src_node = self
            .nodes
            .get(src)
            .ok_or_else(|| ArtificeError::node_not_found(src))?;
        let dst_node = self
            .nodes
            .get(dst)
            .ok_or_else(|| ArtificeError::node_not_found(dst))?;

        let output = match src_node.ports().output(src_port) {
            Some(port) => port,
            None if src_node.ports().input(src_port).is_some() => {
                return Err(ArtificeError::direction(format!(
                    "'{src_port}' on node '{src}' is an input and cannot be a source"
                )));
            }
            None => return Err(ArtificeError::output_not_found(src, src_port)),
        };
        let input = match dst_node.ports().input(dst_port) {
            Some(port) => port,
            None if dst_node.ports().output(dst_port).is_some() => {
                return Err(ArtificeError::direction(format!(
                    "'{dst_port}' on node '{dst}' is an output and cannot be a destination"
                )));
            }
            None => return Err(ArtificeError::input_not_found(dst, dst_port)),
        };

        if src == dst {
            return Err(ArtificeError::cycle(format!("self-loop on node '{src}'")));
        }
        if topology::reaches(&self.connections, dst, src) {
            return Err(ArtificeError::cycle(format!(
                "connecting {src}.{src_port} -> {dst}.{dst_port} would close a cycle"
            )));
        }
        check_compatible(output, input)?;

        let source = PortRef::new(src.clone(), src_port);
        if input.link() == Some(&source) {
            return Ok(());
        }

        self.disconnect_input(dst, dst_port)?;

        let dest = PortRef::new(dst.clone(), dst_port);
        if let Some(port) = self.port_output_mut(src, src_port) {
            port.add_link(dest);
        }
        if let Some(port) = self
            .nodes
            .get_mut(dst)
            .and_then(|n| n.ports_mut().input_mut(dst_port))
        {
            port.set_link(Some(source));
        }
        self.connections
            .push(Connection::new(src.clone(), src_port, dst.clone(), dst_port));
        tracing::debug!(%src, src_port, %dst, dst_port, "connected");
        self.mark_dirty(dst)
    }

    /// Remove the edge `src.src_port -> dst.dst_port`. Returns `false` if it did not exist.
    pub fn disconnect(
        &mut self,
        src: &NodeId,
        src_port: &str,
        dst: &NodeId,
        dst_port: &str,
    ) -> ArtificeResult<bool> {
        self.node(src)
            .ok_or_else(|| ArtificeError::node_not_found(src))?
            .output(src_port)?;
        self.node(dst)
            .ok_or_else(|| ArtificeError::node_not_found(dst))?
            .input(dst_port)?;

        let idx = self.connections.iter().position(|c| {
            &c.source_node == src
                && c.source_port == src_port
                && &c.dest_node == dst
                && c.dest_port == dst_port
        });
        match idx {
            Some(idx) => {
                self.remove_connection_at(idx)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove the incoming edge of `dst.dst_port`, if any.
    pub fn disconnect_input(&mut self, dst: &NodeId, dst_port: &str) -> ArtificeResult<bool> {
        self.node(dst)
            .ok_or_else(|| ArtificeError::node_not_found(dst))?
            .input(dst_port)?;
        let idx = self
            .connections
            .iter()
            .position(|c| &c.dest_node == dst && c.dest_port == dst_port);
        match idx {
            Some(idx) => {
                self.remove_connection_at(idx)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove every edge touching the named port of `id` (either direction).
    pub fn disconnect_port(&mut self, id: &NodeId, port: &str) -> ArtificeResult<usize> {
        let node = self
            .node(id)
            .ok_or_else(|| ArtificeError::node_not_found(id))?;
        if node.ports().input(port).is_none() && node.ports().output(port).is_none() {
            return Err(ArtificeError::PortNotFound {
                node: id.to_string(),
                port: port.to_string(),
                direction: "input or output",
            });
        }
        self.remove_connections_where(|c| c.touches_port(id, port))
    }

    /// Remove every edge touching `id`.
    pub fn disconnect_all(&mut self, id: &NodeId) -> ArtificeResult<usize> {
        if !self.nodes.contains_key(id) {
            return Err(ArtificeError::node_not_found(id));
        }
        self.remove_connections_where(|c| c.touches(id))
    }

    fn remove_connections_where(
        &mut self,
        pred: impl Fn(&Connection) -> bool,
    ) -> ArtificeResult<usize> {
        let mut removed = 0;
        while let Some(idx) = self.connections.iter().position(&pred) {
            self.remove_connection_at(idx)?;
            removed += 1;
        }
        Ok(removed)
    }

    fn remove_connection_at(&mut self, idx: usize) -> ArtificeResult<()> {
        let conn = self.connections.remove(idx);
        if let Some(port) = self.port_output_mut(&conn.source_node, &conn.source_port) {
            port.remove_link(&conn.dest());
        }
        if let Some(port) = self
            .nodes
            .get_mut(&conn.dest_node)
            .and_then(|n| n.ports_mut().input_mut(&conn.dest_port))
        {
            port.set_link(None);
        }
        tracing::debug!(connection = %conn, "disconnected");
        self.mark_dirty(&conn.dest_node)
    }

    fn port_output_mut(&mut self, id: &NodeId, port: &str) -> Option<&mut OutputPort> {
        self.nodes.get_mut(id)?.ports_mut().output_mut(port)
    }

    /// Mark `id` and every node reachable from it dirty, dropping their output caches.
    pub fn mark_dirty(&mut self, id: &NodeId) -> ArtificeResult<()> {
        if !self.nodes.contains_key(id) {
            return Err(ArtificeError::node_not_found(id));
        }
        self.mark_dirty_from([id.clone()]);
        Ok(())
    }

    fn mark_dirty_from(&mut self, seeds: impl IntoIterator<Item = NodeId>) {
        let seeds = seeds.into_iter().collect::<Vec<_>>();
        let affected = topology::downstream(&self.connections, seeds.iter())
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        for id in affected {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.mark_dirty();
            }
        }
    }

    /// Set a parameter and, if the value changed, invalidate the node and its dependents.
    ///
    /// Returns `Ok(false)` when the value is rejected by the parameter's coercion rules.
    pub fn set_parameter(
        &mut self,
        id: &NodeId,
        name: &str,
        value: impl Into<ParamValue>,
    ) -> ArtificeResult<bool> {
        let outcome = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| ArtificeError::node_not_found(id))?
            .apply_parameter(name, value.into())?;
        if outcome == SetOutcome::Changed {
            self.mark_dirty(id)?;
        }
        Ok(outcome.accepted())
    }

    /// Value an input currently resolves to: the linked output's cache, else the default.
    pub fn input_value(&self, id: &NodeId, port: &str) -> ArtificeResult<Option<&Value>> {
        let input = self
            .node(id)
            .ok_or_else(|| ArtificeError::node_not_found(id))?
            .input(port)?;
        Ok(match input.link() {
            Some(link) => self
                .nodes
                .get(&link.node)
                .and_then(|n| n.ports().output(&link.port))
                .and_then(|p| p.value()),
            None => input.default_value(),
        })
    }

    /// Check whether `id` could execute with the current upstream caches.
    pub fn can_execute(&self, id: &NodeId) -> ArtificeResult<()> {
        let node = self
            .node(id)
            .ok_or_else(|| ArtificeError::node_not_found(id))?;
        node.can_execute(&node.resolve_inputs(&self.nodes))
    }

    /// Deterministic topological order; ties are broken by lexical node id.
    pub fn execution_order(&self) -> ArtificeResult<Vec<NodeId>> {
        topology::execution_order(self.nodes.keys(), &self.connections)
    }

    /// Nodes in execution order.
    pub fn iter(&self) -> ArtificeResult<impl Iterator<Item = &Node>> {
        let order = self.execution_order()?;
        Ok(order.into_iter().filter_map(|id| self.nodes.get(&id)))
    }

    /// Last node in execution order that has an IMAGE output, e.g. for previews.
    pub fn terminal_image_node(&self) -> ArtificeResult<Option<NodeId>> {
        let order = self.execution_order()?;
        Ok(order.into_iter().rev().find(|id| {
            self.nodes.get(id).is_some_and(|n| {
                n.ports()
                    .outputs()
                    .iter()
                    .any(|p| p.port_type() == PortType::Image)
            })
        }))
    }

    /// Execute every dirty node on the CPU backend. `force` re-runs everything.
    pub fn execute(&mut self, force: bool) -> ArtificeResult<ExecutionReport> {
        let opts = ExecuteOpts {
            force,
            ..ExecuteOpts::default()
        };
        self.execute_with(&opts, &mut CpuBackend::default())
    }

    /// Execute every dirty node in order on `backend`.
    #[tracing::instrument(
        skip_all,
        fields(graph = self.name.as_deref().unwrap_or(""), nodes = self.nodes.len())
    )]
    pub fn execute_with(
        &mut self,
        opts: &ExecuteOpts,
        backend: &mut dyn ComputeBackend,
    ) -> ArtificeResult<ExecutionReport> {
        let order = self.execution_order()?;
        Ok(self.run(&order, opts, backend))
    }

    /// Execute the prefix of the execution order ending at `target`.
    pub fn execute_to_node(&mut self, target: &NodeId) -> ArtificeResult<ExecutionReport> {
        self.execute_to_node_with(target, &ExecuteOpts::default(), &mut CpuBackend::default())
    }

    /// [`NodeGraph::execute_to_node`] with explicit options and backend.
    #[tracing::instrument(skip_all, fields(target = %target))]
    pub fn execute_to_node_with(
        &mut self,
        target: &NodeId,
        opts: &ExecuteOpts,
        backend: &mut dyn ComputeBackend,
    ) -> ArtificeResult<ExecutionReport> {
        let mut order = self.execution_order()?;
        let pos = order
            .iter()
            .position(|id| id == target)
            .ok_or_else(|| ArtificeError::node_not_found(target))?;
        order.truncate(pos + 1);
        Ok(self.run(&order, opts, backend))
    }

    fn run(
        &mut self,
        order: &[NodeId],
        opts: &ExecuteOpts,
        backend: &mut dyn ComputeBackend,
    ) -> ExecutionReport {
        if opts.force {
            self.mark_dirty_from(order.iter().cloned());
        }

        let mut report = ExecutionReport::default();
        for id in order {
            if opts.halt_on_failure && !report.errors.is_empty() {
                report.skipped.push(id.clone());
                continue;
            }
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            let ran = node.is_dirty();
            let inputs = node.resolve_inputs(&self.nodes);
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            let ok = node.execute(&inputs, backend);
            if ran {
                tracing::debug!(node = %id, kind = node.type_name(), ok, "executed");
            }
            report.record(id, ran, ok, node.last_error());
        }
        if !report.errors.is_empty() {
            tracing::warn!(failed = report.errors.len(), "graph execution had failures");
        }
        report
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/graph.rs"]
mod tests;
