//! Node definitions served by `/object_info`.
//!
//! Definitions come from an extensible registry, so one malformed entry
//! must never stop the rest from loading. [`validate_node_def`] reports a
//! bad entry through a caller-supplied sink and returns `None`.

use comfywire_core::config::ValidationConfig;
use comfywire_core::error::SchemaError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::input_spec::InputSpec;
use crate::validation::{log_diagnostic, validate_reporting, WireSchema};

/// Input parameters grouped by how the node consumes them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputsSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<IndexMap<String, InputSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<IndexMap<String, InputSpec>>,
    /// Values the engine fills in itself (`PROMPT`, `UNIQUE_ID`, ...).
    /// Custom nodes put arbitrary values here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<IndexMap<String, serde_json::Value>>,
}

impl InputsSpec {
    /// Required inputs followed by optional ones, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &InputSpec)> {
        self.required
            .iter()
            .flatten()
            .chain(self.optional.iter().flatten())
    }

    pub fn get(&self, name: &str) -> Option<&InputSpec> {
        self.required
            .as_ref()
            .and_then(|m| m.get(name))
            .or_else(|| self.optional.as_ref().and_then(|m| m.get(name)))
    }
}

/// One output slot type: a data type name, or a list of combo choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputType {
    DataType(String),
    Combo(Vec<serde_json::Value>),
}

/// Descriptor of an executable node class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    pub input: InputsSpec,
    pub output: Vec<OutputType>,
    pub output_is_list: Vec<bool>,
    pub output_name: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tooltips: Option<Vec<String>>,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub category: String,
    pub output_node: bool,
    pub python_module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<bool>,
}

impl NodeDef {
    /// Number of declared output slots.
    pub fn output_count(&self) -> usize {
        self.output.len()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated.unwrap_or(false)
    }

    pub fn is_experimental(&self) -> bool {
        self.experimental.unwrap_or(false)
    }

    /// `output`, `output_is_list` and `output_name` must describe the same slots.
    pub fn check_output_arity(&self) -> Result<(), SchemaError> {
        let (output, output_is_list, output_name) = (
            self.output.len(),
            self.output_is_list.len(),
            self.output_name.len(),
        );
        if output != output_is_list || output != output_name {
            return Err(SchemaError::OutputArity {
                schema: Self::NAME,
                output,
                output_is_list,
                output_name,
            });
        }
        Ok(())
    }
}

impl WireSchema for NodeDef {
    const NAME: &'static str = "ComfyNodeDef";

    fn check(&self, config: &ValidationConfig) -> Result<(), SchemaError> {
        if config.check_output_arity {
            self.check_output_arity()?;
        }
        Ok(())
    }
}

/// Validate one raw node definition with default settings.
///
/// Pass [`log_diagnostic`] as `on_error` to log failures as warnings.
pub fn validate_node_def(
    raw: &serde_json::Value,
    on_error: impl FnOnce(&str),
) -> Option<NodeDef> {
    validate_node_def_with(raw, &ValidationConfig::default(), on_error)
}

/// Validate one raw node definition.
pub fn validate_node_def_with(
    raw: &serde_json::Value,
    config: &ValidationConfig,
    on_error: impl FnOnce(&str),
) -> Option<NodeDef> {
    validate_reporting::<NodeDef>(raw, config, on_error)
}

/// Validate with default settings, logging failures.
pub fn validate_node_def_logged(raw: &serde_json::Value) -> Option<NodeDef> {
    validate_node_def(raw, log_diagnostic)
}

/// Validate a whole `/object_info` payload (`{class_name: definition}`).
///
/// Malformed entries are reported to `on_error` and left out; the rest keep
/// their server order. Fails only if the payload is not an object.
pub fn validate_node_defs(
    raw: &serde_json::Value,
    config: &ValidationConfig,
    mut on_error: impl FnMut(&str),
) -> Result<IndexMap<String, NodeDef>, SchemaError> {
    let entries = raw
        .as_object()
        .ok_or_else(|| SchemaError::mismatch("ObjectInfo", "expected an object keyed by node class"))?;

    let mut defs = IndexMap::with_capacity(entries.len());
    for (class_name, entry) in entries {
        if let Some(def) = validate_node_def_with(entry, config, &mut on_error) {
            defs.insert(class_name.clone(), def);
        }
    }

    tracing::debug!(
        accepted = defs.len(),
        rejected = entries.len() - defs.len(),
        "Validated node definitions",
    );
    Ok(defs)
}
