use std::sync::Arc;

use crate::imaging::buffer::ImageBuffer;

/// Data type carried by a port.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortType {
    /// [`ImageBuffer`] payloads.
    Image,
    /// Flat `f32` arrays with a shape (transform coefficients, masks).
    Array,
    /// Scalar float.
    Float,
    /// Scalar integer.
    Int,
    /// Boolean flag.
    Bool,
    /// Text.
    String,
    /// Accepts and produces anything.
    Any,
}

impl PortType {
    /// Connection rule: identical types, or either side is [`PortType::Any`].
    pub fn can_connect_to(self, other: PortType) -> bool {
        self == other || self == PortType::Any || other == PortType::Any
    }

    /// Upper-case tag used in documents and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            PortType::Image => "IMAGE",
            PortType::Array => "ARRAY",
            PortType::Float => "FLOAT",
            PortType::Int => "INT",
            PortType::Bool => "BOOL",
            PortType::String => "STRING",
            PortType::Any => "ANY",
        }
    }
}

impl std::fmt::Display for PortType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// N-dimensional `f32` array payload for ARRAY ports.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayData {
    /// Dimension sizes; their product equals `data.len()`.
    pub shape: Vec<usize>,
    /// Row-major samples.
    pub data: Arc<Vec<f32>>,
}

/// A value flowing through a connection.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Image payload.
    Image(ImageBuffer),
    /// Array payload.
    Array(ArrayData),
    /// Float scalar.
    Float(f64),
    /// Integer scalar.
    Int(i64),
    /// Boolean flag.
    Bool(bool),
    /// Text.
    String(String),
}

impl Value {
    /// The port type this payload belongs to.
    pub fn port_type(&self) -> PortType {
        match self {
            Value::Image(_) => PortType::Image,
            Value::Array(_) => PortType::Array,
            Value::Float(_) => PortType::Float,
            Value::Int(_) => PortType::Int,
            Value::Bool(_) => PortType::Bool,
            Value::String(_) => PortType::String,
        }
    }

    /// `true` when this payload may be stored on a port of type `port_type`.
    pub fn fits(&self, port_type: PortType) -> bool {
        port_type == PortType::Any || self.port_type() == port_type
    }

    /// Borrow the image payload, if any.
    pub fn as_image(&self) -> Option<&ImageBuffer> {
        match self {
            Value::Image(img) => Some(img),
            _ => None,
        }
    }
}

impl From<ImageBuffer> for Value {
    fn from(img: ImageBuffer) -> Self {
        Value::Image(img)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}
