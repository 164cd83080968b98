use std::collections::BTreeSet;

use crate::foundation::core::PortRef;
use crate::foundation::error::{ArtificeError, ArtificeResult};
use crate::node::value::{PortType, Value};

/// Input endpoint. Holds at most one incoming link (single writer).
#[derive(Clone, Debug)]
pub struct InputPort {
    name: String,
    port_type: PortType,
    description: String,
    required: bool,
    default: Option<Value>,
    link: Option<PortRef>,
}

impl InputPort {
    pub(crate) fn new(name: &str, port_type: PortType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            port_type,
            description: description.to_string(),
            required: true,
            default: None,
            link: None,
        }
    }

    /// Mark the port as not required; an unconnected optional input never blocks execution.
    pub fn optional(&mut self) -> &mut Self {
        self.required = false;
        self
    }

    /// Value used when the port is unconnected.
    pub fn with_default(&mut self, value: Value) -> &mut Self {
        self.default = Some(value);
        self
    }

    /// Port name, unique among the node's inputs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared data type.
    pub fn port_type(&self) -> PortType {
        self.port_type
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the port must resolve to a value for the node to execute.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Default value used when unconnected.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Replace the default value.
    pub fn set_default(&mut self, value: Option<Value>) {
        self.default = value;
    }

    /// Upstream output this input reads from.
    pub fn link(&self) -> Option<&PortRef> {
        self.link.as_ref()
    }

    /// `true` when an upstream output is linked.
    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// Set or clear the incoming link, returning the evicted one.
    pub(crate) fn set_link(&mut self, link: Option<PortRef>) -> Option<PortRef> {
        std::mem::replace(&mut self.link, link)
    }
}

/// Output endpoint. Owns the cached value and the set of linked inputs.
#[derive(Clone, Debug)]
pub struct OutputPort {
    name: String,
    port_type: PortType,
    description: String,
    value: Option<Value>,
    links: BTreeSet<PortRef>,
}

impl OutputPort {
    pub(crate) fn new(name: &str, port_type: PortType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            port_type,
            description: description.to_string(),
            value: None,
            links: BTreeSet::new(),
        }
    }

    /// Port name, unique among the node's outputs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared data type.
    pub fn port_type(&self) -> PortType {
        self.port_type
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Cached value from the last successful execution.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Store a value. Linked inputs are not notified; they read on demand.
    pub fn set_value(&mut self, value: Value) -> ArtificeResult<()> {
        if !value.fits(self.port_type) {
            return Err(ArtificeError::type_mismatch(format!(
                "output '{}' is {} but was given {}",
                self.name,
                self.port_type,
                value.port_type()
            )));
        }
        self.value = Some(value);
        Ok(())
    }

    pub(crate) fn store(&mut self, value: Option<Value>) {
        self.value = value;
    }

    /// Drop the cached value.
    pub fn invalidate_cache(&mut self) {
        self.value = None;
    }

    /// Inputs linked to this output.
    pub fn links(&self) -> &BTreeSet<PortRef> {
        &self.links
    }

    /// `true` when at least one input is linked.
    pub fn is_connected(&self) -> bool {
        !self.links.is_empty()
    }

    pub(crate) fn add_link(&mut self, input: PortRef) {
        self.links.insert(input);
    }

    pub(crate) fn remove_link(&mut self, input: &PortRef) -> bool {
        self.links.remove(input)
    }
}

/// Port compatibility check used before linking.
pub fn check_compatible(output: &OutputPort, input: &InputPort) -> ArtificeResult<()> {
    if output.port_type().can_connect_to(input.port_type()) {
        Ok(())
    } else {
        Err(ArtificeError::type_mismatch(format!(
            "cannot connect {} output '{}' to {} input '{}'",
            output.port_type(),
            output.name(),
            input.port_type(),
            input.name()
        )))
    }
}

/// Ordered port declarations of a node, populated once by `define_ports`.
#[derive(Clone, Debug, Default)]
pub struct PortSet {
    inputs: Vec<InputPort>,
    outputs: Vec<OutputPort>,
}

impl PortSet {
    /// Declare an input. Re-declaring a name replaces the earlier declaration.
    pub fn add_input(
        &mut self,
        name: &str,
        port_type: PortType,
        description: &str,
    ) -> &mut InputPort {
        let port = InputPort::new(name, port_type, description);
        let idx = match self.inputs.iter().position(|p| p.name == name) {
            Some(idx) => {
                self.inputs[idx] = port;
                idx
            }
            None => {
                self.inputs.push(port);
                self.inputs.len() - 1
            }
        };
        &mut self.inputs[idx]
    }

    /// Declare an output. Re-declaring a name replaces the earlier declaration.
    pub fn add_output(
        &mut self,
        name: &str,
        port_type: PortType,
        description: &str,
    ) -> &mut OutputPort {
        let port = OutputPort::new(name, port_type, description);
        let idx = match self.outputs.iter().position(|p| p.name == name) {
            Some(idx) => {
                self.outputs[idx] = port;
                idx
            }
            None => {
                self.outputs.push(port);
                self.outputs.len() - 1
            }
        };
        &mut self.outputs[idx]
    }

    /// Inputs in declaration order.
    pub fn inputs(&self) -> &[InputPort] {
        &self.inputs
    }

    /// Outputs in declaration order.
    pub fn outputs(&self) -> &[OutputPort] {
        &self.outputs
    }

    /// Look up an input by name.
    pub fn input(&self, name: &str) -> Option<&InputPort> {
        self.inputs.iter().find(|p| p.name == name)
    }

    /// Look up an output by name.
    pub fn output(&self, name: &str) -> Option<&OutputPort> {
        self.outputs.iter().find(|p| p.name == name)
    }

    pub(crate) fn input_mut(&mut self, name: &str) -> Option<&mut InputPort> {
        self.inputs.iter_mut().find(|p| p.name == name)
    }

    pub(crate) fn output_mut(&mut self, name: &str) -> Option<&mut OutputPort> {
        self.outputs.iter_mut().find(|p| p.name == name)
    }

    pub(crate) fn outputs_mut(&mut self) -> &mut [OutputPort] {
        &mut self.outputs
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/port.rs"]
mod tests;
