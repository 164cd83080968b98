use std::collections::BTreeMap;

use crate::backend::{ComputeBackend, PixelKernel};
use crate::foundation::core::{NodeId, PortRef};
use crate::foundation::error::{ArtificeError, ArtificeResult};
use crate::imaging::buffer::ImageBuffer;
use crate::node::node::Node;
use crate::node::parameter::{ParamValue, ParameterSet};
use crate::node::port::OutputPort;
use crate::node::value::Value;

/// Read access to upstream output caches, resolved by [`PortRef`].
pub trait ValueSource {
    /// Cached value of the referenced output, if any.
    fn output_value(&self, port: &PortRef) -> Option<&Value>;
}

impl ValueSource for BTreeMap<NodeId, Node> {
    fn output_value(&self, port: &PortRef) -> Option<&Value> {
        self.get(&port.node)?.ports().output(&port.port)?.value()
    }
}

/// Source for nodes outside a graph: no upstream values exist.
#[derive(Clone, Copy, Debug, Default)]
pub struct Detached;

impl ValueSource for Detached {
    fn output_value(&self, _port: &PortRef) -> Option<&Value> {
        None
    }
}

/// Input values of one node, resolved before execution.
///
/// Every declared input has an entry; `None` means neither an upstream value nor a default.
#[derive(Clone, Debug, Default)]
pub struct InputValues {
    pub(crate) values: BTreeMap<String, Option<Value>>,
}

impl InputValues {
    /// Resolved value of a declared input.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).and_then(Option::as_ref)
    }

    /// `true` if `name` is a declared input.
    pub fn is_declared(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }
}

/// Everything a [`crate::NodeKind::process`] call may touch.
///
/// Outputs are staged and only committed to the node's ports when processing succeeds.
pub struct ProcessContext<'a> {
    node: &'a NodeId,
    inputs: &'a InputValues,
    params: &'a ParameterSet,
    outputs: &'a [OutputPort],
    staged: BTreeMap<String, Value>,
    backend: &'a mut dyn ComputeBackend,
}

impl<'a> ProcessContext<'a> {
    pub(crate) fn new(
        node: &'a NodeId,
        inputs: &'a InputValues,
        params: &'a ParameterSet,
        outputs: &'a [OutputPort],
        backend: &'a mut dyn ComputeBackend,
    ) -> Self {
        Self {
            node,
            inputs,
            params,
            outputs,
            staged: BTreeMap::new(),
            backend,
        }
    }

    /// Id of the node being processed.
    pub fn node_id(&self) -> &NodeId {
        self.node
    }

    /// Value of an input, or `None` when unconnected without default.
    pub fn input(&self, name: &str) -> ArtificeResult<Option<&Value>> {
        if !self.inputs.is_declared(name) {
            return Err(ArtificeError::input_not_found(self.node, name));
        }
        Ok(self.inputs.get(name))
    }

    /// Image on input `name`; fails with "No input image" when absent or not an image.
    pub fn require_image(&self, name: &str) -> ArtificeResult<&ImageBuffer> {
        self.input(name)?
            .and_then(Value::as_image)
            .ok_or_else(|| ArtificeError::processing("No input image"))
    }

    /// Current value of a parameter.
    pub fn param(&self, name: &str) -> ArtificeResult<&ParamValue> {
        self.params
            .get(name)
            .map(|p| p.value())
            .ok_or_else(|| ArtificeError::parameter_not_found(self.node, name))
    }

    /// Numeric parameter as `f64`.
    pub fn param_f64(&self, name: &str) -> ArtificeResult<f64> {
        self.param(name)?.as_f64().ok_or_else(|| {
            ArtificeError::processing(format!("parameter '{name}' is not numeric"))
        })
    }

    /// Numeric parameter as `i64`.
    pub fn param_i64(&self, name: &str) -> ArtificeResult<i64> {
        self.param(name)?.as_i64().ok_or_else(|| {
            ArtificeError::processing(format!("parameter '{name}' is not an integer"))
        })
    }

    /// Flag parameter.
    pub fn param_bool(&self, name: &str) -> ArtificeResult<bool> {
        self.param(name)?
            .as_bool()
            .ok_or_else(|| ArtificeError::processing(format!("parameter '{name}' is not a flag")))
    }

    /// Text, enum or path parameter.
    pub fn param_str(&self, name: &str) -> ArtificeResult<&str> {
        self.param(name)?
            .as_str()
            .ok_or_else(|| ArtificeError::processing(format!("parameter '{name}' is not text")))
    }

    /// Stage a value for output `name`. Unknown names and ill-typed payloads are rejected.
    pub fn set_output(&mut self, name: &str, value: impl Into<Value>) -> ArtificeResult<()> {
        let value = value.into();
        let port = self
            .outputs
            .iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| ArtificeError::output_not_found(self.node, name))?;
        if !value.fits(port.port_type()) {
            return Err(ArtificeError::type_mismatch(format!(
                "output '{name}' is {} but was given {}",
                port.port_type(),
                value.port_type()
            )));
        }
        self.staged.insert(name.to_string(), value);
        Ok(())
    }

    /// Run a pixel kernel on the active compute backend.
    pub fn dispatch(
        &mut self,
        kernel: &dyn PixelKernel,
        image: &ImageBuffer,
    ) -> ArtificeResult<ImageBuffer> {
        self.backend.dispatch(kernel, image)
    }

    /// Name of the active compute backend.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub(crate) fn into_staged(self) -> BTreeMap<String, Value> {
        self.staged
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/context.rs"]
mod tests;
