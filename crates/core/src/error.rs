use std::fmt::Display;

/// Failure produced when a raw wire value does not match a schema.
///
/// Every variant is recoverable: callers log it and move on to the next
/// record in a batch.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Invalid {schema}: {message}")]
    Mismatch {
        schema: &'static str,
        message: String,
    },

    #[error(
        "Invalid {schema}: output slots disagree (output: {output}, \
         output_is_list: {output_is_list}, output_name: {output_name})"
    )]
    OutputArity {
        schema: &'static str,
        output: usize,
        output_is_list: usize,
        output_name: usize,
    },

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    /// Structural mismatch against the named schema.
    pub fn mismatch(schema: &'static str, message: impl Display) -> Self {
        Self::Mismatch {
            schema,
            message: message.to_string(),
        }
    }

    /// Name of the schema the value was checked against, if known.
    pub fn schema(&self) -> Option<&'static str> {
        match self {
            Self::Mismatch { schema, .. } | Self::OutputArity { schema, .. } => Some(schema),
            Self::Json(_) => None,
        }
    }
}
