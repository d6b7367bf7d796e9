//! JSON Schema validation for analyzer configuration files.
//!
//! Config files are validated against `schemas/config.schema.json` before
//! being deserialized, so typos in key names fail loudly instead of being
//! silently ignored.

use std::sync::OnceLock;
use thiserror::Error;

/// Embedded config schema (loaded at compile time).
const CONFIG_SCHEMA_JSON: &str = include_str!("../../schemas/config.schema.json");

/// Compiled JSON Schema validator (initialized once, reused).
static COMPILED_SCHEMA: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

/// Errors from schema loading.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to load schema: {0}")]
    LoadError(String),
}

fn get_validator() -> Result<&'static jsonschema::Validator, SchemaError> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let schema_value: serde_json::Value = match serde_json::from_str(CONFIG_SCHEMA_JSON) {
            Ok(v) => v,
            Err(e) => return Err(format!("Invalid schema JSON: {}", e)),
        };

        match jsonschema::options().build(&schema_value) {
            Ok(v) => Ok(v),
            Err(e) => Err(format!("Failed to compile schema: {}", e)),
        }
    });

    match result {
        Ok(v) => Ok(v),
        Err(e) => Err(SchemaError::LoadError(e.clone())),
    }
}

/// Validate a config value against the schema.
///
/// Returns every violation, each suffixed with its location.
pub fn validate_config_schema(config_json: &serde_json::Value) -> Result<(), Vec<String>> {
    let validator = get_validator().map_err(|e| vec![e.to_string()])?;

    let errors: Vec<String> = validator
        .iter_errors(config_json)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_passes() {
        let value = serde_json::json!({
            "joget": {
                "base_url": "https://joget.example.com/jw",
                "app_id": "seguros",
                "form_id": "tramite"
            }
        });
        assert!(validate_config_schema(&value).is_ok());
    }

    #[test]
    fn test_missing_form_id_fails() {
        let value = serde_json::json!({
            "joget": {
                "base_url": "https://joget.example.com/jw",
                "app_id": "seguros"
            }
        });
        let errors = validate_config_schema(&value).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_unknown_key_fails() {
        let value = serde_json::json!({
            "joget": {
                "base_url": "https://joget.example.com/jw",
                "app_id": "seguros",
                "form_id": "tramite",
                "apikey": "typo"
            }
        });
        assert!(validate_config_schema(&value).is_err());
    }

    #[test]
    fn test_non_http_base_url_fails() {
        let value = serde_json::json!({
            "joget": {
                "base_url": "joget.example.com",
                "app_id": "seguros",
                "form_id": "tramite"
            }
        });
        assert!(validate_config_schema(&value).is_err());
    }

    #[test]
    fn test_oracle_temperature_out_of_range() {
        let value = serde_json::json!({
            "joget": {
                "base_url": "https://joget.example.com/jw",
                "app_id": "seguros",
                "form_id": "tramite"
            },
            "oracle": { "provider": "openai", "temperature": 5 }
        });
        assert!(validate_config_schema(&value).is_err());
    }
}
