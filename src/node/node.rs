use std::collections::BTreeMap;

use crate::backend::ComputeBackend;
use crate::foundation::core::{NodeId, Point};
use crate::foundation::error::{ArtificeError, ArtificeResult};
use crate::graph::document::NodeDocument;
use crate::node::context::{Detached, InputValues, ProcessContext, ValueSource};
use crate::node::parameter::{ChangeHook, ParamValue, Parameter, ParameterSet, SetOutcome};
use crate::node::port::{InputPort, OutputPort, PortSet};
use crate::node::value::Value;

/// Class-level metadata of a node kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeInfo {
    /// Registry key and document type tag.
    pub type_name: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Palette category.
    pub category: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Optional icon name for front ends.
    pub icon: Option<&'static str>,
}

/// The node-type-specific part of a node.
///
/// Implementors declare their ports and parameters once and compute outputs in
/// [`NodeKind::process`]. Errors returned from `process` are contained by [`Node::execute`].
pub trait NodeKind: std::fmt::Debug + Send {
    /// Metadata for registry listings and documents.
    fn info(&self) -> NodeInfo;

    /// Declare input and output ports.
    fn define_ports(&self, ports: &mut PortSet);

    /// Declare parameters.
    fn define_parameters(&self, _params: &mut ParameterSet) {}

    /// Compute outputs from inputs and parameters.
    fn process(&mut self, ctx: &mut ProcessContext<'_>) -> ArtificeResult<()>;
}

/// A node instance: a [`NodeKind`] plus its ports, parameters and execution state.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    kind: Box<dyn NodeKind>,
    ports: PortSet,
    parameters: ParameterSet,
    position: Point,
    dirty: bool,
    error: Option<String>,
}

impl Node {
    /// Build a node with a freshly generated id.
    pub fn new(kind: Box<dyn NodeKind>) -> Self {
        Self::with_id(kind, NodeId::generate())
    }

    /// Build a node with a known id, e.g. one restored from a document.
    pub fn with_id(kind: Box<dyn NodeKind>, id: NodeId) -> Self {
        let mut ports = PortSet::default();
        kind.define_ports(&mut ports);
        let mut parameters = ParameterSet::default();
        kind.define_parameters(&mut parameters);
        Self {
            id,
            kind,
            ports,
            parameters,
            position: Point::ZERO,
            dirty: true,
            error: None,
        }
    }

    /// Convenience for `Node::new(Box::new(kind))`.
    pub fn from_kind<K: NodeKind + 'static>(kind: K) -> Self {
        Self::new(Box::new(kind))
    }

    /// Stable id.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Metadata of the node kind.
    pub fn info(&self) -> NodeInfo {
        self.kind.info()
    }

    /// Registry key of the node kind.
    pub fn type_name(&self) -> &'static str {
        self.kind.info().type_name
    }

    /// Port declarations and link state.
    pub fn ports(&self) -> &PortSet {
        &self.ports
    }

    pub(crate) fn ports_mut(&mut self) -> &mut PortSet {
        &mut self.ports
    }

    /// Input port by name.
    pub fn input(&self, name: &str) -> ArtificeResult<&InputPort> {
        self.ports
            .input(name)
            .ok_or_else(|| ArtificeError::input_not_found(&self.id, name))
    }

    /// Output port by name.
    pub fn output(&self, name: &str) -> ArtificeResult<&OutputPort> {
        self.ports
            .output(name)
            .ok_or_else(|| ArtificeError::output_not_found(&self.id, name))
    }

    /// Cached value of an output.
    pub fn output_value(&self, name: &str) -> ArtificeResult<Option<&Value>> {
        Ok(self.output(name)?.value())
    }

    /// Store an output value directly, outside of `process`.
    pub fn set_output_value(&mut self, name: &str, value: impl Into<Value>) -> ArtificeResult<()> {
        let id = &self.id;
        self.ports
            .output_mut(name)
            .ok_or_else(|| ArtificeError::output_not_found(id, name))?
            .set_value(value.into())
    }

    /// Replace the default value of an input.
    pub fn set_input_default(&mut self, name: &str, value: Option<Value>) -> ArtificeResult<()> {
        let id = &self.id;
        self.ports
            .input_mut(name)
            .ok_or_else(|| ArtificeError::input_not_found(id, name))?
            .set_default(value);
        self.mark_dirty();
        Ok(())
    }

    /// Parameter declarations.
    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Parameter by name.
    pub fn parameter(&self, name: &str) -> ArtificeResult<&Parameter> {
        self.parameters
            .get(name)
            .ok_or_else(|| ArtificeError::parameter_not_found(&self.id, name))
    }

    /// Current value of a parameter.
    pub fn get_parameter(&self, name: &str) -> ArtificeResult<&ParamValue> {
        Ok(self.parameter(name)?.value())
    }

    /// Set a parameter through its coercion rules. `Ok(false)` means the value was rejected.
    ///
    /// A change marks this node dirty. Edits made through [`crate::NodeGraph::set_parameter`]
    /// or [`crate::NodeGraph::edit_node`] also invalidate downstream nodes before returning.
    pub fn set_parameter(
        &mut self,
        name: &str,
        value: impl Into<ParamValue>,
    ) -> ArtificeResult<bool> {
        Ok(self.apply_parameter(name, value.into())?.accepted())
    }

    pub(crate) fn apply_parameter(
        &mut self,
        name: &str,
        value: ParamValue,
    ) -> ArtificeResult<SetOutcome> {
        let id = &self.id;
        let outcome = self
            .parameters
            .get_mut(name)
            .ok_or_else(|| ArtificeError::parameter_not_found(id, name))?
            .apply(value);
        if outcome == SetOutcome::Changed {
            self.mark_dirty();
        }
        Ok(outcome)
    }

    /// Reset every parameter to its default.
    pub fn reset_parameters(&mut self) {
        let mut changed = false;
        for param in self.parameters.iter_mut() {
            let default = param.default_value().clone();
            changed |= param.apply(default) == SetOutcome::Changed;
        }
        if changed {
            self.mark_dirty();
        }
    }

    /// Install the same change hook on every parameter.
    pub fn set_parameter_hook(&mut self, hook: Option<ChangeHook>) {
        for param in self.parameters.iter_mut() {
            param.set_change_hook(hook.clone());
        }
    }

    /// Editor position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Move the node in the editor. Does not affect execution state.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// `true` when the cached outputs are stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark this node stale and drop its output caches.
    ///
    /// Only this node is touched here; [`crate::NodeGraph::mark_dirty`] and
    /// [`crate::NodeGraph::edit_node`] propagate downstream.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        for output in self.ports.outputs_mut() {
            output.invalidate_cache();
        }
    }

    /// Error recorded by the last failed execution.
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Resolve every declared input: the linked output's cache when connected, else the default.
    pub fn resolve_inputs(&self, source: &dyn ValueSource) -> InputValues {
        let values = self
            .ports
            .inputs()
            .iter()
            .map(|input| {
                let value = match input.link() {
                    Some(link) => source.output_value(link).cloned(),
                    None => input.default_value().cloned(),
                };
                (input.name().to_string(), value)
            })
            .collect::<BTreeMap<_, _>>();
        InputValues { values }
    }

    /// Check every required input has a value.
    pub fn can_execute(&self, inputs: &InputValues) -> ArtificeResult<()> {
        for input in self.ports.inputs() {
            if !input.is_required() || inputs.get(input.name()).is_some() {
                continue;
            }
            let reason = if input.is_connected() {
                format!("Required input '{}' has no upstream value", input.name())
            } else {
                format!("Required input '{}' not connected", input.name())
            };
            return Err(ArtificeError::missing_input(reason));
        }
        Ok(())
    }

    /// Run the node if dirty. Failures are recorded in [`Node::last_error`], never raised.
    ///
    /// On success outputs are replaced and the node becomes clean. On failure outputs are
    /// cleared and the node stays dirty.
    pub fn execute(&mut self, inputs: &InputValues, backend: &mut dyn ComputeBackend) -> bool {
        if !self.dirty {
            return true;
        }
        if let Err(err) = self.can_execute(inputs) {
            self.fail(err);
            return false;
        }
        self.error = None;

        let mut ctx = ProcessContext::new(
            &self.id,
            inputs,
            &self.parameters,
            self.ports.outputs(),
            backend,
        );
        let result = self.kind.process(&mut ctx);
        let mut staged = ctx.into_staged();

        match result {
            Ok(()) => {
                for output in self.ports.outputs_mut() {
                    output.store(staged.remove(output.name()));
                }
                self.dirty = false;
                true
            }
            Err(err) => {
                self.fail(err);
                false
            }
        }
    }

    /// Execute a node that is not part of a graph; inputs resolve to their defaults.
    pub fn execute_detached(&mut self, backend: &mut dyn ComputeBackend) -> bool {
        let inputs = self.resolve_inputs(&Detached);
        self.execute(&inputs, backend)
    }

    fn fail(&mut self, err: ArtificeError) {
        tracing::debug!(node = %self.id, error = %err, "node execution failed");
        self.error = Some(err.to_string());
        for output in self.ports.outputs_mut() {
            output.invalidate_cache();
        }
    }

    /// Persisted form: type tag, id, position and parameter values.
    pub fn to_document(&self) -> NodeDocument {
        NodeDocument {
            node_type: self.type_name().to_string(),
            id: self.id.clone(),
            position: [self.position.x, self.position.y],
            parameters: self
                .parameters
                .iter()
                .map(|p| (p.name().to_string(), p.value().to_json()))
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/node.rs"]
mod tests;
