/// Convenience result type used across Artifice.
pub type ArtificeResult<T> = Result<T, ArtificeError>;

/// Top-level error taxonomy used by graph, node and registry APIs.
#[derive(thiserror::Error, Debug)]
pub enum ArtificeError {
    /// A port name that does not exist on the referenced node.
    #[error("port not found: node '{node}' has no {direction} port '{port}'")]
    PortNotFound {
        /// Node that was searched.
        node: String,
        /// Requested port name.
        port: String,
        /// `"input"` or `"output"`.
        direction: &'static str,
    },

    /// A parameter name that does not exist on the referenced node.
    #[error("parameter not found: node '{node}' has no parameter '{name}'")]
    ParameterNotFound {
        /// Node that was searched.
        node: String,
        /// Requested parameter name.
        name: String,
    },

    /// A node id that is not part of the graph.
    #[error("node not found: '{0}'")]
    NodeNotFound(String),

    /// A node id that is already part of the graph.
    #[error("duplicate node id: '{0}'")]
    DuplicateNode(String),

    /// Incompatible port types or a payload that does not fit its port.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Port roles swapped (input used as a source or output used as a destination).
    #[error("direction error: {0}")]
    Direction(String),

    /// The connection would create a cycle or a self-loop.
    #[error("cycle rejected: {0}")]
    CycleRejected(String),

    /// A required input is unavailable.
    #[error("missing required input: {0}")]
    MissingRequiredInput(String),

    /// A node's own computation failed.
    #[error("processing failure: {0}")]
    Processing(String),

    /// A persisted document referenced a type tag with no registered constructor.
    #[error("unknown node type: '{0}'")]
    UnknownNodeType(String),

    /// Malformed persisted document.
    #[error("schema error: {0}")]
    Schema(String),

    /// File system errors at document or image boundaries.
    #[error("io error: {0}")]
    Io(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ArtificeError {
    /// Build an [`ArtificeError::PortNotFound`] for an input port.
    pub fn input_not_found(node: impl Into<String>, port: impl Into<String>) -> Self {
        Self::PortNotFound {
            node: node.into(),
            port: port.into(),
            direction: "input",
        }
    }

    /// Build an [`ArtificeError::PortNotFound`] for an output port.
    pub fn output_not_found(node: impl Into<String>, port: impl Into<String>) -> Self {
        Self::PortNotFound {
            node: node.into(),
            port: port.into(),
            direction: "output",
        }
    }

    /// Build an [`ArtificeError::ParameterNotFound`] value.
    pub fn parameter_not_found(node: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ParameterNotFound {
            node: node.into(),
            name: name.into(),
        }
    }

    /// Build an [`ArtificeError::NodeNotFound`] value.
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound(id.into())
    }

    /// Build an [`ArtificeError::TypeMismatch`] value.
    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        Self::TypeMismatch(msg.into())
    }

    /// Build an [`ArtificeError::Direction`] value.
    pub fn direction(msg: impl Into<String>) -> Self {
        Self::Direction(msg.into())
    }

    /// Build an [`ArtificeError::CycleRejected`] value.
    pub fn cycle(msg: impl Into<String>) -> Self {
        Self::CycleRejected(msg.into())
    }

    /// Build an [`ArtificeError::MissingRequiredInput`] value.
    pub fn missing_input(msg: impl Into<String>) -> Self {
        Self::MissingRequiredInput(msg.into())
    }

    /// Build an [`ArtificeError::Processing`] value.
    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing(msg.into())
    }

    /// Build an [`ArtificeError::UnknownNodeType`] value.
    pub fn unknown_node_type(tag: impl Into<String>) -> Self {
        Self::UnknownNodeType(tag.into())
    }

    /// Build an [`ArtificeError::Schema`] value.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Build an [`ArtificeError::Io`] value.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
