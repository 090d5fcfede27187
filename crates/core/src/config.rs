//! Validation settings loaded from environment variables.

/// Knobs that change how strictly decoded values are checked and how
/// much of a rejected payload ends up in diagnostics.
///
/// All fields have defaults matching the engine's own client behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Reject node definitions whose `output`, `output_is_list` and
    /// `output_name` arrays differ in length (default: `true`).
    pub check_output_arity: bool,
    /// Include the raw payload in diagnostic text (default: `true`).
    pub log_payloads: bool,
    /// Truncate logged payloads to this many bytes (default: `2048`).
    pub max_logged_payload_bytes: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            check_output_arity: true,
            log_payloads: true,
            max_logged_payload_bytes: 2048,
        }
    }
}

/// Errors from reading configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl ValidationConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                              | Default |
    /// |--------------------------------------|---------|
    /// | `COMFYWIRE_CHECK_OUTPUT_ARITY`       | `true`  |
    /// | `COMFYWIRE_LOG_PAYLOADS`             | `true`  |
    /// | `COMFYWIRE_MAX_LOGGED_PAYLOAD_BYTES` | `2048`  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let check_output_arity = match lookup("COMFYWIRE_CHECK_OUTPUT_ARITY") {
            Some(v) => parse_bool("COMFYWIRE_CHECK_OUTPUT_ARITY", &v)?,
            None => defaults.check_output_arity,
        };

        let log_payloads = match lookup("COMFYWIRE_LOG_PAYLOADS") {
            Some(v) => parse_bool("COMFYWIRE_LOG_PAYLOADS", &v)?,
            None => defaults.log_payloads,
        };

        let max_logged_payload_bytes = match lookup("COMFYWIRE_MAX_LOGGED_PAYLOAD_BYTES") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "COMFYWIRE_MAX_LOGGED_PAYLOAD_BYTES",
                expected: "usize",
                value: v.clone(),
            })?,
            None => defaults.max_logged_payload_bytes,
        };

        Ok(Self {
            check_output_arity,
            log_payloads,
            max_logged_payload_bytes,
        })
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            expected: "boolean",
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = ValidationConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ValidationConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = ValidationConfig::from_lookup(lookup(&[
            ("COMFYWIRE_CHECK_OUTPUT_ARITY", "false"),
            ("COMFYWIRE_LOG_PAYLOADS", "0"),
            ("COMFYWIRE_MAX_LOGGED_PAYLOAD_BYTES", "64"),
        ]))
        .unwrap();
        assert!(!config.check_output_arity);
        assert!(!config.log_payloads);
        assert_eq!(config.max_logged_payload_bytes, 64);
    }

    #[test]
    fn invalid_boolean_is_rejected() {
        let err = ValidationConfig::from_lookup(lookup(&[("COMFYWIRE_LOG_PAYLOADS", "maybe")]))
            .unwrap_err();
        assert!(err.to_string().contains("COMFYWIRE_LOG_PAYLOADS"));
    }

    #[test]
    fn invalid_size_is_rejected() {
        let result = ValidationConfig::from_lookup(lookup(&[(
            "COMFYWIRE_MAX_LOGGED_PAYLOAD_BYTES",
            "-1",
        )]));
        assert!(result.is_err());
    }
}
