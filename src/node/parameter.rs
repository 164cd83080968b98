use std::sync::Arc;

use crate::foundation::error::{ArtificeError, ArtificeResult};

/// Type tag of a [`Parameter`].
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParamType {
    /// Bounded float.
    #[default]
    Float,
    /// Bounded integer.
    Int,
    /// Flag.
    Bool,
    /// Free text.
    String,
    /// One of a fixed set of choices.
    Enum,
    /// RGBA color, components in `[0,1]`.
    Color,
    /// Control points `(x, y)`.
    Curve,
    /// File system path.
    Filepath,
}

/// Current or default value of a [`Parameter`].
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    /// Float value.
    Float(f64),
    /// Integer value.
    Int(i64),
    /// Flag value.
    Bool(bool),
    /// Text, enum choice or path.
    String(String),
    /// RGBA color.
    Color([f64; 4]),
    /// Curve control points.
    Curve(Vec<[f64; 2]>),
}

impl ParamValue {
    /// Numeric view; ints widen, bools map to 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Bool(v) => Some(f64::from(u8::from(*v))),
            _ => None,
        }
    }

    /// Integer view; floats truncate.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Float(v) if v.is_finite() => Some(v.trunc() as i64),
            ParamValue::Bool(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    /// Flag view.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Text view.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to a JSON value for documents.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ParamValue::Float(v) => serde_json::json!(v),
            ParamValue::Int(v) => serde_json::json!(v),
            ParamValue::Bool(v) => serde_json::json!(v),
            ParamValue::String(s) => serde_json::json!(s),
            ParamValue::Color(c) => serde_json::json!(c),
            ParamValue::Curve(points) => serde_json::json!(points),
        }
    }

    /// Read a JSON value. Arrays of 3 or 4 numbers are colors, arrays of pairs are curves.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(ParamValue::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(ParamValue::Int)
                .or_else(|| n.as_f64().map(ParamValue::Float)),
            serde_json::Value::String(s) => Some(ParamValue::String(s.clone())),
            serde_json::Value::Array(items) if items.is_empty() => {
                Some(ParamValue::Curve(Vec::new()))
            }
            serde_json::Value::Array(items) => {
                if items.iter().all(serde_json::Value::is_number) {
                    let comps: Vec<f64> = items.iter().filter_map(|v| v.as_f64()).collect();
                    match comps.as_slice() {
                        [r, g, b] => Some(ParamValue::Color([*r, *g, *b, 1.0])),
                        [r, g, b, a] => Some(ParamValue::Color([*r, *g, *b, *a])),
                        _ => None,
                    }
                } else {
                    items
                        .iter()
                        .map(|p| match p.as_array().map(Vec::as_slice) {
                            Some([x, y]) => Some([x.as_f64()?, y.as_f64()?]),
                            _ => None,
                        })
                        .collect::<Option<Vec<_>>>()
                        .map(ParamValue::Curve)
                }
            }
            serde_json::Value::Null | serde_json::Value::Object(_) => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(i64::from(v))
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::String(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::String(v)
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::String(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

/// Callback invoked with the parameter name and new value after a change.
pub type ChangeHook = Arc<dyn Fn(&str, &ParamValue) + Send + Sync>;

/// Result of a [`Parameter::set`] attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetOutcome {
    /// Coercion failed; value untouched.
    Rejected,
    /// Accepted but equal to the previous value.
    Unchanged,
    /// Value changed and the change hook fired.
    Changed,
}

impl SetOutcome {
    /// `true` unless the value was rejected.
    pub fn accepted(self) -> bool {
        self != SetOutcome::Rejected
    }
}

/// Typed, validated and bounded node configuration value.
#[derive(Clone)]
pub struct Parameter {
    name: String,
    param_type: ParamType,
    default: ParamValue,
    value: ParamValue,
    min: Option<f64>,
    max: Option<f64>,
    step: Option<f64>,
    choices: Vec<String>,
    description: String,
    hidden: bool,
    file_filter: Option<String>,
    save_path: bool,
    on_change: Option<ChangeHook>,
}

impl std::fmt::Debug for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("param_type", &self.param_type)
            .field("value", &self.value)
            .field("default", &self.default)
            .field("min", &self.min)
            .field("max", &self.max)
            .finish_non_exhaustive()
    }
}

impl Parameter {
    fn with_type(name: &str, param_type: ParamType, default: ParamValue) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            value: default.clone(),
            default,
            min: None,
            max: None,
            step: None,
            choices: Vec::new(),
            description: String::new(),
            hidden: false,
            file_filter: None,
            save_path: false,
            on_change: None,
        }
    }

    /// FLOAT parameter.
    pub fn float(name: &str, default: f64) -> Self {
        Self::with_type(name, ParamType::Float, ParamValue::Float(default))
    }

    /// INT parameter.
    pub fn int(name: &str, default: i64) -> Self {
        Self::with_type(name, ParamType::Int, ParamValue::Int(default))
    }

    /// BOOL parameter.
    pub fn boolean(name: &str, default: bool) -> Self {
        Self::with_type(name, ParamType::Bool, ParamValue::Bool(default))
    }

    /// STRING parameter.
    pub fn string(name: &str, default: &str) -> Self {
        Self::with_type(name, ParamType::String, ParamValue::from(default))
    }

    /// ENUM parameter restricted to `choices`.
    pub fn choice(name: &str, default: &str, choices: &[&str]) -> Self {
        let mut p = Self::with_type(name, ParamType::Enum, ParamValue::from(default));
        p.choices = choices.iter().map(|c| c.to_string()).collect();
        p
    }

    /// COLOR parameter.
    pub fn color(name: &str, default: [f64; 4]) -> Self {
        Self::with_type(name, ParamType::Color, ParamValue::Color(default))
    }

    /// CURVE parameter.
    pub fn curve(name: &str, default: Vec<[f64; 2]>) -> Self {
        Self::with_type(name, ParamType::Curve, ParamValue::Curve(default))
    }

    /// FILEPATH parameter.
    pub fn file_path(name: &str, default: &str) -> Self {
        Self::with_type(name, ParamType::Filepath, ParamValue::from(default))
    }

    /// Inclusive numeric bounds.
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// UI step hint.
    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// Human-readable description.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Hide from the parameter panel.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// File dialog filter, e.g. `"Images (*.png *.jpg)"`.
    pub fn file_filter(mut self, filter: &str) -> Self {
        self.file_filter = Some(filter.to_string());
        self
    }

    /// The path names a file to write rather than read.
    pub fn save_path(mut self) -> Self {
        self.save_path = true;
        self
    }

    /// Install the change hook.
    pub fn on_change(mut self, hook: ChangeHook) -> Self {
        self.on_change = Some(hook);
        self
    }

    pub(crate) fn set_change_hook(&mut self, hook: Option<ChangeHook>) {
        self.on_change = hook;
    }

    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type tag.
    pub fn param_type(&self) -> ParamType {
        self.param_type
    }

    /// Current value.
    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    /// Default value.
    pub fn default_value(&self) -> &ParamValue {
        &self.default
    }

    /// Lower bound.
    pub fn min(&self) -> Option<f64> {
        self.min
    }

    /// Upper bound.
    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// Step hint.
    pub fn step_hint(&self) -> Option<f64> {
        self.step
    }

    /// Allowed ENUM choices.
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// Description text.
    pub fn description_text(&self) -> &str {
        &self.description
    }

    /// Hidden from UI.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// File dialog filter for FILEPATH parameters.
    pub fn filter(&self) -> Option<&str> {
        self.file_filter.as_deref()
    }

    /// FILEPATH names an output file.
    pub fn is_save_path(&self) -> bool {
        self.save_path
    }

    /// Coerce, clamp and store `value`. Returns `false` when coercion fails.
    pub fn set(&mut self, value: impl Into<ParamValue>) -> bool {
        self.apply(value.into()).accepted()
    }

    /// Set back to the default through the regular `set` path.
    pub fn reset(&mut self) -> bool {
        let default = self.default.clone();
        self.apply(default).accepted()
    }

    /// Like [`Parameter::set`] but reports whether the stored value changed.
    pub fn apply(&mut self, value: ParamValue) -> SetOutcome {
        let Some(coerced) = coerce(self.param_type, value, &self.choices) else {
            return SetOutcome::Rejected;
        };
        let next = self.clamp(coerced);
        if next == self.value {
            return SetOutcome::Unchanged;
        }
        self.value = next;
        if let Some(hook) = &self.on_change {
            hook(&self.name, &self.value);
        }
        SetOutcome::Changed
    }

    fn clamp(&self, value: ParamValue) -> ParamValue {
        match value {
            ParamValue::Float(mut v) => {
                if let Some(min) = self.min {
                    v = v.max(min);
                }
                if let Some(max) = self.max {
                    v = v.min(max);
                }
                ParamValue::Float(v)
            }
            ParamValue::Int(mut v) => {
                if let Some(min) = self.min {
                    v = v.max(min.ceil() as i64);
                }
                if let Some(max) = self.max {
                    v = v.min(max.floor() as i64);
                }
                ParamValue::Int(v)
            }
            other => other,
        }
    }

    /// Persisted form of this parameter.
    pub fn to_document(&self) -> ParameterDocument {
        ParameterDocument {
            name: self.name.clone(),
            param_type: self.param_type,
            value: self.value.to_json(),
            default: self.default.to_json(),
            min_value: self.min,
            max_value: self.max,
            step: self.step,
            choices: self.choices.clone(),
            description: self.description.clone(),
            ui_hidden: self.hidden,
            file_filter: self.file_filter.clone(),
            is_save_path: self.save_path,
        }
    }

    /// Rebuild a parameter from its persisted form.
    pub fn from_document(doc: ParameterDocument) -> ArtificeResult<Self> {
        let default = ParamValue::from_json(&doc.default)
            .and_then(|v| coerce(doc.param_type, v, &doc.choices))
            .ok_or_else(|| {
                ArtificeError::schema(format!(
                    "parameter '{}': default {} is not a valid {:?}",
                    doc.name, doc.default, doc.param_type
                ))
            })?;

        let mut param = Self::with_type(&doc.name, doc.param_type, default);
        param.min = doc.min_value;
        param.max = doc.max_value;
        param.step = doc.step;
        param.choices = doc.choices;
        param.description = doc.description;
        param.hidden = doc.ui_hidden;
        param.file_filter = doc.file_filter;
        param.save_path = doc.is_save_path;

        if !doc.value.is_null() {
            let accepted = ParamValue::from_json(&doc.value)
                .map(|v| param.apply(v).accepted())
                .unwrap_or(false);
            if !accepted {
                return Err(ArtificeError::schema(format!(
                    "parameter '{}': value {} is not a valid {:?}",
                    param.name, doc.value, param.param_type
                )));
            }
        }
        Ok(param)
    }

    /// Parse a persisted parameter from JSON. Unknown type tags are schema errors.
    pub fn from_json(value: serde_json::Value) -> ArtificeResult<Self> {
        let doc: ParameterDocument = serde_json::from_value(value)
            .map_err(|e| ArtificeError::schema(format!("parameter document: {e}")))?;
        Self::from_document(doc)
    }
}

/// Type-directed coercion. `None` means the value cannot represent `param_type`.
///
/// Non-finite numbers are rejected: they have no JSON form.
fn coerce(param_type: ParamType, value: ParamValue, choices: &[String]) -> Option<ParamValue> {
    match param_type {
        ParamType::Float => match value {
            ParamValue::String(s) => s.trim().parse::<f64>().ok(),
            other => other.as_f64(),
        }
        .filter(|v| v.is_finite())
        .map(ParamValue::Float),
        ParamType::Int => match value {
            ParamValue::String(s) => s.trim().parse::<i64>().ok(),
            other => other.as_i64(),
        }
        .map(ParamValue::Int),
        ParamType::Bool => Some(ParamValue::Bool(match value {
            ParamValue::Bool(b) => b,
            ParamValue::Int(v) => v != 0,
            ParamValue::Float(v) => v != 0.0,
            ParamValue::String(s) => !s.is_empty(),
            ParamValue::Color(_) => true,
            ParamValue::Curve(points) => !points.is_empty(),
        })),
        ParamType::String => Some(ParamValue::String(value.to_string())),
        ParamType::Enum => match value {
            ParamValue::String(s) if choices.is_empty() || choices.contains(&s) => {
                Some(ParamValue::String(s))
            }
            _ => None,
        },
        ParamType::Color => match value {
            ParamValue::Color(c) if c.iter().all(|v| v.is_finite()) => {
                Some(ParamValue::Color(c.map(|v| v.clamp(0.0, 1.0))))
            }
            ParamValue::String(s) => parse_hex_color(&s).map(ParamValue::Color),
            _ => None,
        },
        ParamType::Curve => match value {
            ParamValue::Curve(points) if points.iter().flatten().all(|v| v.is_finite()) => {
                Some(ParamValue::Curve(points))
            }
            _ => None,
        },
        ParamType::Filepath => match value {
            ParamValue::String(s) => Some(ParamValue::String(s)),
            _ => None,
        },
    }
}

/// `#rrggbb` or `#rrggbbaa`.
fn parse_hex_color(s: &str) -> Option<[f64; 4]> {
    let hex = s.strip_prefix('#')?;
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| {
        u8::from_str_radix(hex.get(i..i + 2)?, 16)
            .ok()
            .map(|v| f64::from(v) / 255.0)
    };
    let a = if hex.len() == 8 { channel(6)? } else { 1.0 };
    Some([channel(0)?, channel(2)?, channel(4)?, a])
}

/// Persisted parameter state.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParameterDocument {
    /// Parameter name.
    pub name: String,
    /// Type tag.
    #[serde(default)]
    pub param_type: ParamType,
    /// Current value.
    #[serde(default)]
    pub value: serde_json::Value,
    /// Default value.
    pub default: serde_json::Value,
    /// Lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    /// Upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    /// Step hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    /// ENUM choices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Hidden from UI.
    #[serde(default)]
    pub ui_hidden: bool,
    /// FILEPATH filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_filter: Option<String>,
    /// FILEPATH names an output file.
    #[serde(default)]
    pub is_save_path: bool,
}

/// Ordered parameter declarations of a node.
#[derive(Clone, Debug, Default)]
pub struct ParameterSet {
    params: Vec<Parameter>,
}

impl ParameterSet {
    /// Declare a parameter. Re-declaring a name replaces the earlier declaration.
    pub fn add(&mut self, param: Parameter) {
        match self.params.iter_mut().find(|p| p.name == param.name) {
            Some(slot) => *slot = param,
            None => self.params.push(param),
        }
    }

    /// Look up by name.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Look up by name, mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.params.iter_mut().find(|p| p.name == name)
    }

    /// Parameters in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Parameter> {
        self.params.iter_mut()
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// `true` when no parameters are declared.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/parameter.rs"]
mod tests;
