//! Node input specifications and their wire-form normalization.
//!
//! An input spec is written on the wire in one of three shapes:
//!
//! | Shape  | Example                     | Normalized to           |
//! |--------|-----------------------------|-------------------------|
//! | pair   | `["INT", {"min": 0}]`       | itself                  |
//! | single | `["INT"]`                   | `["INT", {}]`           |
//! | bare   | `"INT"`                     | `["INT", {}]`           |
//!
//! The bare shape is only accepted for `INT`, `FLOAT`, `BOOLEAN` and
//! `STRING`. Variants are tried in the order of [`MATCH_ORDER`] and the
//! first one whose tag and options both match wins; that order is part of
//! the contract because it settles inputs more than one variant could
//! claim.
//!
//! Option records keep every key they do not model in `extra`, so values
//! added by third-party nodes survive a round trip.

use comfywire_core::error::SchemaError;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

const SCHEMA: &str = "InputSpec";

/// Type tags owned by the builtin variants; never valid as a custom type.
pub const RESERVED_TYPE_TAGS: [&str; 5] = ["INT", "FLOAT", "BOOLEAN", "STRING", "COMBO"];

// ---------------------------------------------------------------------------
// Option records
// ---------------------------------------------------------------------------

/// Options shared by every input (also the full option set of custom types).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseInputOptions {
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
    /// Show as a socket instead of a widget.
    #[serde(rename = "forceInput", default, skip_serializing_if = "Option::is_none")]
    pub force_input: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Numeric default: node authors commonly pass a list through INT/FLOAT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericDefault {
    Scalar(Number),
    List(Vec<Number>),
}

impl NumericDefault {
    fn to_value(&self) -> Value {
        match self {
            Self::Scalar(n) => Value::Number(n.clone()),
            Self::List(ns) => Value::Array(ns.iter().cloned().map(Value::Number).collect()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntInputOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<NumericDefault>,
    #[serde(rename = "forceInput", default, skip_serializing_if = "Option::is_none")]
    pub force_input: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Value of FLOAT's `round` option: a precision, or `false` to disable.
#[derive(Debug, Clone, PartialEq)]
pub enum FloatRounding {
    Precision(Number),
    Disabled,
}

impl Serialize for FloatRounding {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Precision(n) => n.serialize(serializer),
            Self::Disabled => serializer.serialize_bool(false),
        }
    }
}

impl<'de> Deserialize<'de> for FloatRounding {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => Ok(Self::Precision(n)),
            Value::Bool(false) => Ok(Self::Disabled),
            other => Err(D::Error::custom(format!(
                "`round` must be a number or false, got {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FloatInputOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<NumericDefault>,
    #[serde(rename = "forceInput", default, skip_serializing_if = "Option::is_none")]
    pub force_input: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<FloatRounding>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BooleanInputOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    #[serde(rename = "forceInput", default, skip_serializing_if = "Option::is_none")]
    pub force_input: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_off: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StringInputOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(rename = "forceInput", default, skip_serializing_if = "Option::is_none")]
    pub force_input: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiline: Option<bool>,
    #[serde(rename = "dynamicPrompts", default, skip_serializing_if = "Option::is_none")]
    pub dynamic_prompts: Option<bool>,
    /// Multiline widgets only.
    #[serde(rename = "defaultVal", default, skip_serializing_if = "Option::is_none")]
    pub default_val: Option<String>,
    /// Multiline widgets only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComboInputOptions {
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
    #[serde(rename = "forceInput", default, skip_serializing_if = "Option::is_none")]
    pub force_input: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_after_generate: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_upload: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Keep an explicit `null` as `Some(Value::Null)` instead of `None`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// InputSpec
// ---------------------------------------------------------------------------

/// Canonical form of one input parameter description.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSpec {
    Int(IntInputOptions),
    Float(FloatInputOptions),
    Boolean(BooleanInputOptions),
    String(StringInputOptions),
    /// Dropdown; the wire tag position holds the choices themselves.
    Combo {
        choices: Vec<Value>,
        options: ComboInputOptions,
    },
    /// Any other data type (`MODEL`, `IMAGE`, `LATENT`, ...).
    Custom {
        type_name: String,
        options: BaseInputOptions,
    },
}

/// Wire shape an input spec was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireShape {
    Pair,
    Single,
    Bare,
}

/// Variant kinds, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Int,
    Float,
    Boolean,
    String,
    Combo,
    Custom,
}

/// Order in which variants are matched against a raw value.
pub const MATCH_ORDER: [InputKind; 6] = [
    InputKind::Int,
    InputKind::Float,
    InputKind::Boolean,
    InputKind::String,
    InputKind::Combo,
    InputKind::Custom,
];

impl InputKind {
    /// Whether a bare tag (no wrapping array) is accepted.
    pub fn allows_upcast(self) -> bool {
        !matches!(self, Self::Combo | Self::Custom)
    }

    fn builtin_tag(self) -> Option<&'static str> {
        match self {
            Self::Int => Some("INT"),
            Self::Float => Some("FLOAT"),
            Self::Boolean => Some("BOOLEAN"),
            Self::String => Some("STRING"),
            Self::Combo | Self::Custom => None,
        }
    }

    /// Build the variant if `tag` belongs to it.
    ///
    /// `Ok(None)` means the tag is not this variant's; `Err` means the tag
    /// matched but the options did not.
    fn build(self, tag: &Value, options: Option<&Value>) -> Result<Option<InputSpec>, String> {
        if let Some(builtin) = self.builtin_tag() {
            if tag.as_str() != Some(builtin) {
                return Ok(None);
            }
        }

        let spec = match self {
            Self::Int => InputSpec::Int(parse_options(builtin_label(self), options)?),
            Self::Float => InputSpec::Float(parse_options(builtin_label(self), options)?),
            Self::Boolean => InputSpec::Boolean(parse_options(builtin_label(self), options)?),
            Self::String => InputSpec::String(parse_options(builtin_label(self), options)?),
            Self::Combo => {
                let Some(choices) = tag.as_array() else {
                    return Ok(None);
                };
                InputSpec::Combo {
                    choices: choices.clone(),
                    options: parse_options("COMBO", options)?,
                }
            }
            Self::Custom => {
                let Some(type_name) = tag.as_str().filter(|t| !is_reserved_type_tag(t)) else {
                    return Ok(None);
                };
                InputSpec::Custom {
                    type_name: type_name.to_string(),
                    options: parse_options(type_name, options)?,
                }
            }
        };
        Ok(Some(spec))
    }
}

fn builtin_label(kind: InputKind) -> &'static str {
    kind.builtin_tag().unwrap_or("COMBO")
}

fn parse_options<T>(label: &str, options: Option<&Value>) -> Result<T, String>
where
    T: DeserializeOwned + Default,
{
    match options {
        None => Ok(T::default()),
        Some(value) => T::deserialize(value).map_err(|e| format!("{label} options: {e}")),
    }
}

/// Whether `tag` is one of the builtin type tags.
pub fn is_reserved_type_tag(tag: &str) -> bool {
    RESERVED_TYPE_TAGS.contains(&tag)
}

fn split_wire(raw: &Value) -> Option<(&Value, Option<&Value>, WireShape)> {
    match raw {
        Value::Array(items) => match items.as_slice() {
            [tag, options] => Some((tag, Some(options), WireShape::Pair)),
            [tag] => Some((tag, None, WireShape::Single)),
            _ => None,
        },
        tag => Some((tag, None, WireShape::Bare)),
    }
}

impl InputSpec {
    /// Normalize a raw wire value into its canonical variant.
    pub fn from_wire(raw: &Value) -> Result<Self, SchemaError> {
        Self::from_wire_with_shape(raw).map(|(spec, _)| spec)
    }

    /// Like [`from_wire`](Self::from_wire), also reporting the shape matched.
    pub fn from_wire_with_shape(raw: &Value) -> Result<(Self, WireShape), SchemaError> {
        let (tag, options, shape) = split_wire(raw).ok_or_else(|| {
            SchemaError::mismatch(SCHEMA, format!("expected a 1- or 2-element array, got {raw}"))
        })?;

        let mut option_error = None;
        for kind in MATCH_ORDER {
            if shape == WireShape::Bare && !kind.allows_upcast() {
                continue;
            }
            match kind.build(tag, options) {
                Ok(Some(spec)) => return Ok((spec, shape)),
                Ok(None) => {}
                Err(e) => {
                    option_error.get_or_insert(e);
                }
            }
        }

        Err(SchemaError::mismatch(
            SCHEMA,
            option_error.unwrap_or_else(|| format!("no input type accepts {raw}")),
        ))
    }

    /// Canonical `[tag, options]` form.
    pub fn to_wire(&self) -> Value {
        let (tag, options) = match self {
            Self::Int(o) => (Value::from("INT"), serde_json::to_value(o)),
            Self::Float(o) => (Value::from("FLOAT"), serde_json::to_value(o)),
            Self::Boolean(o) => (Value::from("BOOLEAN"), serde_json::to_value(o)),
            Self::String(o) => (Value::from("STRING"), serde_json::to_value(o)),
            Self::Combo { choices, options } => {
                (Value::Array(choices.clone()), serde_json::to_value(options))
            }
            Self::Custom { type_name, options } => {
                (Value::from(type_name.as_str()), serde_json::to_value(options))
            }
        };
        // Option records hold plain JSON values; encoding them cannot fail.
        Value::Array(vec![tag, options.unwrap_or_default()])
    }

    pub fn kind(&self) -> InputKind {
        match self {
            Self::Int(_) => InputKind::Int,
            Self::Float(_) => InputKind::Float,
            Self::Boolean(_) => InputKind::Boolean,
            Self::String(_) => InputKind::String,
            Self::Combo { .. } => InputKind::Combo,
            Self::Custom { .. } => InputKind::Custom,
        }
    }

    /// Type name as shown to users: the tag, or `COMBO` for dropdowns.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Custom { type_name, .. } => type_name.as_str(),
            other => builtin_label(other.kind()),
        }
    }

    /// Dropdown choices, for COMBO inputs.
    pub fn choices(&self) -> Option<&[Value]> {
        match self {
            Self::Combo { choices, .. } => Some(choices.as_slice()),
            _ => None,
        }
    }

    pub fn default_value(&self) -> Option<Value> {
        match self {
            Self::Int(o) => o.default.as_ref().map(NumericDefault::to_value),
            Self::Float(o) => o.default.as_ref().map(NumericDefault::to_value),
            Self::Boolean(o) => o.default.map(Value::Bool),
            Self::String(o) => o.default.clone().map(Value::String),
            Self::Combo { options, .. } => options.default.clone(),
            Self::Custom { options, .. } => options.default.clone(),
        }
    }

    pub fn force_input(&self) -> bool {
        let flag = match self {
            Self::Int(o) => o.force_input,
            Self::Float(o) => o.force_input,
            Self::Boolean(o) => o.force_input,
            Self::String(o) => o.force_input,
            Self::Combo { options, .. } => options.force_input,
            Self::Custom { options, .. } => options.force_input,
        };
        flag.unwrap_or(false)
    }

    /// Option keys this crate does not model.
    pub fn extra(&self) -> &Map<String, Value> {
        match self {
            Self::Int(o) => &o.extra,
            Self::Float(o) => &o.extra,
            Self::Boolean(o) => &o.extra,
            Self::String(o) => &o.extra,
            Self::Combo { options, .. } => &options.extra,
            Self::Custom { options, .. } => &options.extra,
        }
    }
}

impl Serialize for InputSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Int(o) => ("INT", o).serialize(serializer),
            Self::Float(o) => ("FLOAT", o).serialize(serializer),
            Self::Boolean(o) => ("BOOLEAN", o).serialize(serializer),
            Self::String(o) => ("STRING", o).serialize(serializer),
            Self::Combo { choices, options } => (choices, options).serialize(serializer),
            Self::Custom { type_name, options } => (type_name, options).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for InputSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Self::from_wire(&raw).map_err(D::Error::custom)
    }
}
