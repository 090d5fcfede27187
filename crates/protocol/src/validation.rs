//! One validation path for every schema, with two ways to report failure.
//!
//! [`validate`] returns a `Result`. [`validate_reporting`] wraps it for
//! callers that hand over a diagnostic sink and want `Option` back. Both
//! go through the same deserialize-then-check sequence.

use comfywire_core::config::ValidationConfig;
use comfywire_core::error::SchemaError;
use serde::de::DeserializeOwned;

/// A wire type that can be checked against a raw decoded value.
pub trait WireSchema: DeserializeOwned {
    /// Schema name used in diagnostics.
    const NAME: &'static str;

    /// Cross-field checks that run after the shape matched.
    fn check(&self, _config: &ValidationConfig) -> Result<(), SchemaError> {
        Ok(())
    }
}

/// Validate `raw` against `T`.
pub fn validate<T: WireSchema>(
    raw: &serde_json::Value,
    config: &ValidationConfig,
) -> Result<T, SchemaError> {
    let value = T::deserialize(raw).map_err(|e| SchemaError::mismatch(T::NAME, e))?;
    value.check(config)?;
    Ok(value)
}

/// Validate `raw`, passing a diagnostic to `on_error` on failure.
pub fn validate_reporting<T: WireSchema>(
    raw: &serde_json::Value,
    config: &ValidationConfig,
    on_error: impl FnOnce(&str),
) -> Option<T> {
    match validate::<T>(raw, config) {
        Ok(value) => Some(value),
        Err(e) => {
            on_error(&diagnostic(&e, raw, config));
            None
        }
    }
}

/// Default diagnostic sink: emit a warning through `tracing`.
pub fn log_diagnostic(message: &str) {
    tracing::warn!("{message}");
}

/// Human-readable description of a failure, for logs only.
pub fn diagnostic(err: &SchemaError, raw: &serde_json::Value, config: &ValidationConfig) -> String {
    if !config.log_payloads {
        return err.to_string();
    }
    let payload = truncate_payload(raw.to_string(), config.max_logged_payload_bytes);
    format!("{err}\npayload: {payload}")
}

fn truncate_payload(mut text: String, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text;
    }
    let mut cut = max_bytes;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
    text.push_str("...");
    text
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Pair {
        left: u8,
        right: u8,
    }

    impl WireSchema for Pair {
        const NAME: &'static str = "Pair";

        fn check(&self, _config: &ValidationConfig) -> Result<(), SchemaError> {
            if self.left > self.right {
                return Err(SchemaError::mismatch(Self::NAME, "left exceeds right"));
            }
            Ok(())
        }
    }

    #[test]
    fn shape_and_check_both_apply() {
        let config = ValidationConfig::default();
        assert!(validate::<Pair>(&json!({"left": 1, "right": 2}), &config).is_ok());

        let err = validate::<Pair>(&json!({"left": 3, "right": 2}), &config).unwrap_err();
        assert!(err.to_string().contains("left exceeds right"));

        let err = validate::<Pair>(&json!({"left": 1}), &config).unwrap_err();
        assert_eq!(err.schema(), Some("Pair"));
    }

    #[test]
    fn reporting_calls_sink_once_on_failure() {
        let config = ValidationConfig::default();
        let mut seen = Vec::new();
        let out = validate_reporting::<Pair>(&json!("nope"), &config, |m| seen.push(m.to_string()));
        assert!(out.is_none());
        assert_eq!(seen.len(), 1);
        assert!(seen[0].starts_with("Invalid Pair"));
        assert!(seen[0].contains("payload: \"nope\""));
    }

    #[test]
    fn reporting_skips_sink_on_success() {
        let config = ValidationConfig::default();
        let out = validate_reporting::<Pair>(&json!({"left": 0, "right": 0}), &config, |_| {
            panic!("sink must not be called")
        });
        assert!(out.is_some());
    }

    #[test]
    fn payload_can_be_omitted() {
        let config = ValidationConfig {
            log_payloads: false,
            ..ValidationConfig::default()
        };
        let err = SchemaError::mismatch("Pair", "bad");
        assert_eq!(diagnostic(&err, &json!({"secret": 1}), &config), "Invalid Pair: bad");
    }

    #[test]
    fn long_payload_is_truncated_on_char_boundary() {
        let text = "ééééé".to_string(); // 10 bytes
        let out = truncate_payload(text, 3);
        assert_eq!(out, "é...");
    }
}
