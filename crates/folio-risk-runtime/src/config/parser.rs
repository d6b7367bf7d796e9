//! Analyzer configuration from YAML or environment variables.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::schema::validate_config_schema;
use crate::providers::{OPENAI_API_KEY_ENV, OPENAI_BASE_URL_ENV};

/// Default timeout for form-service calls.
pub const DEFAULT_JOGET_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for oracle calls.
pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default oracle model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default oracle provider.
pub const DEFAULT_PROVIDER: &str = "openai";

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse config: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Config failed schema validation: {}", .0.join("; "))]
    SchemaError(Vec<String>),

    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Form-service connection settings.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct JogetConfig {
    /// Base URL, e.g. `https://joget.example.com/jw`
    pub base_url: String,

    /// Application that owns the form
    pub app_id: String,

    /// Form holding folio records
    pub form_id: String,

    /// API key; falls back to `JOGET_API_KEY` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_joget_timeout", with = "duration_str")]
    pub timeout: Duration,
}

impl fmt::Debug for JogetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JogetConfig")
            .field("base_url", &self.base_url)
            .field("app_id", &self.app_id)
            .field("form_id", &self.form_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Scoring-oracle settings. Absent from [`AnalyzerConfig`] means no oracle.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct OracleConfig {
    /// Provider type registered in the provider registry (e.g. `openai`)
    pub provider: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_oracle_timeout", with = "duration_str")]
    pub timeout: Duration,

    /// Provider-specific options passed to the provider factory
    #[serde(default = "empty_object")]
    pub options: JsonValue,
}

impl fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let option_keys: Vec<&String> = self
            .options
            .as_object()
            .map(|o| o.keys().collect())
            .unwrap_or_default();
        f.debug_struct("OracleConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("options", &option_keys)
            .finish()
    }
}

impl OracleConfig {
    /// Oracle settings with defaults for the given provider.
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: default_model(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            timeout: DEFAULT_ORACLE_TIMEOUT,
            options: empty_object(),
        }
    }
}

/// Complete analyzer configuration.
///
/// Passed explicitly into the clients that need it; nothing is cached
/// process-wide.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyzerConfig {
    pub joget: JogetConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oracle: Option<OracleConfig>,
}

impl AnalyzerConfig {
    /// Parse configuration from a YAML string, validating it against the
    /// embedded schema.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let value: JsonValue = serde_yaml::from_str(yaml)?;
        validate_config_schema(&value).map_err(ConfigError::SchemaError)?;
        let config: AnalyzerConfig = serde_json::from_value(value)?;
        Ok(config)
    }

    /// Parse configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// Reads `JOGET_BASE_URL`, `JOGET_APP_ID`, `JOGET_TRAMITE_FORM_ID`
    /// (required), `JOGET_API_KEY`, `JOGET_TIMEOUT`, and configures an oracle
    /// when `LLM_PROVIDER`, `LLM_MODEL` or `OPENAI_API_KEY` is set
    /// (`LLM_TEMPERATURE`, `LLM_MAX_TOKENS`, `LLM_TIMEOUT` optional). A bare
    /// API key selects the default provider and model.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require =
            |key: &str| get(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()));

        let joget = JogetConfig {
            base_url: require("JOGET_BASE_URL")?,
            app_id: require("JOGET_APP_ID")?,
            form_id: require("JOGET_TRAMITE_FORM_ID")?,
            api_key: get("JOGET_API_KEY"),
            timeout: match get("JOGET_TIMEOUT") {
                Some(v) => parse_duration("JOGET_TIMEOUT", &v)?,
                None => DEFAULT_JOGET_TIMEOUT,
            },
        };

        let provider = get("LLM_PROVIDER");
        let model = get("LLM_MODEL");
        let api_key_set = get(OPENAI_API_KEY_ENV).is_some();
        let oracle = if provider.is_some() || model.is_some() || api_key_set {
            let mut oracle =
                OracleConfig::new(provider.unwrap_or_else(|| DEFAULT_PROVIDER.to_string()));
            if let Some(model) = model {
                oracle.model = model;
            }
            if let Some(v) = get("LLM_TEMPERATURE") {
                oracle.temperature = parse_number("LLM_TEMPERATURE", &v)?;
            }
            if let Some(v) = get("LLM_MAX_TOKENS") {
                oracle.max_tokens = parse_number("LLM_MAX_TOKENS", &v)?;
            }
            if let Some(v) = get("LLM_TIMEOUT") {
                oracle.timeout = parse_duration("LLM_TIMEOUT", &v)?;
            }
            // The API key stays in the environment; providers resolve it there.
            if let Some(url) = get(OPENAI_BASE_URL_ENV) {
                oracle.options["base_url"] = JsonValue::String(url);
            }
            Some(oracle)
        } else {
            None
        };

        Ok(Self { joget, oracle })
    }
}

fn parse_duration(key: &str, value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value.trim()).map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn default_joget_timeout() -> Duration {
    DEFAULT_JOGET_TIMEOUT
}

fn default_oracle_timeout() -> Duration {
    DEFAULT_ORACLE_TIMEOUT
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn empty_object() -> JsonValue {
    JsonValue::Object(Default::default())
}

/// Durations as human-readable strings (`10s`, `1m 30s`).
mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const FULL_CONFIG: &str = r#"
joget:
  base_url: "https://joget.example.com/jw"
  app_id: "seguros"
  form_id: "tramite"
  api_key: "joget-secret"
  timeout: "5s"
oracle:
  provider: "openai"
  model: "gpt-4o"
  temperature: 0.2
  timeout: "1m"
  options:
    base_url: "https://llm.internal/v1"
"#;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const JOGET_VARS: [(&str, &str); 3] = [
        ("JOGET_BASE_URL", "https://joget.example.com/jw"),
        ("JOGET_APP_ID", "seguros"),
        ("JOGET_TRAMITE_FORM_ID", "tramite"),
    ];

    #[test]
    fn test_parse_full_yaml() {
        let config = AnalyzerConfig::from_yaml(FULL_CONFIG).unwrap();

        assert_eq!(config.joget.app_id, "seguros");
        assert_eq!(config.joget.timeout, Duration::from_secs(5));
        let oracle = config.oracle.unwrap();
        assert_eq!(oracle.model, "gpt-4o");
        assert_eq!(oracle.max_tokens, 500);
        assert_eq!(oracle.timeout, Duration::from_secs(60));
        assert_eq!(oracle.options["base_url"], "https://llm.internal/v1");
    }

    #[test]
    fn test_yaml_defaults() {
        let yaml = r#"
joget:
  base_url: "http://localhost:8080/jw"
  app_id: "a"
  form_id: "f"
"#;
        let config = AnalyzerConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.joget.timeout, DEFAULT_JOGET_TIMEOUT);
        assert_eq!(config.joget.api_key, None);
        assert!(config.oracle.is_none());
    }

    #[test]
    fn test_yaml_schema_violation() {
        let yaml = r#"
joget:
  base_url: "http://localhost:8080/jw"
  app_id: "a"
"#;
        assert!(matches!(
            AnalyzerConfig::from_yaml(yaml),
            Err(ConfigError::SchemaError(_))
        ));
    }

    #[test]
    fn test_yaml_bad_duration() {
        let yaml = r#"
joget:
  base_url: "http://localhost:8080/jw"
  app_id: "a"
  form_id: "f"
  timeout: "soon"
"#;
        assert!(matches!(
            AnalyzerConfig::from_yaml(yaml),
            Err(ConfigError::JsonError(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AnalyzerConfig::from_yaml(FULL_CONFIG).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("joget-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_env_without_oracle() {
        let config = AnalyzerConfig::from_lookup(lookup(&JOGET_VARS)).unwrap();

        assert_eq!(config.joget.base_url, "https://joget.example.com/jw");
        assert_eq!(config.joget.form_id, "tramite");
        assert!(config.oracle.is_none());
    }

    #[test]
    fn test_env_with_oracle() {
        let mut vars = JOGET_VARS.to_vec();
        vars.push(("LLM_MODEL", "gpt-4o-mini"));
        vars.push(("LLM_TEMPERATURE", "0.3"));
        vars.push(("JOGET_TIMEOUT", "2s"));
        vars.push(("OPENAI_BASE_URL", "http://localhost:11434/v1"));

        let config = AnalyzerConfig::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.joget.timeout, Duration::from_secs(2));
        let oracle = config.oracle.unwrap();
        assert_eq!(oracle.provider, "openai");
        assert_eq!(oracle.model, "gpt-4o-mini");
        assert!((oracle.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(oracle.options["base_url"], "http://localhost:11434/v1");
    }

    #[test]
    fn test_env_api_key_alone_enables_oracle() {
        let mut vars = JOGET_VARS.to_vec();
        vars.push(("JOGET_API_KEY", "joget-secret"));
        vars.push(("OPENAI_API_KEY", "sk-test"));

        let config = AnalyzerConfig::from_lookup(lookup(&vars)).unwrap();

        let oracle = config.oracle.expect("oracle should be configured");
        assert_eq!(oracle.provider, DEFAULT_PROVIDER);
        assert_eq!(oracle.model, DEFAULT_MODEL);
        assert_eq!(oracle.timeout, DEFAULT_ORACLE_TIMEOUT);
        // The key itself is resolved by the provider, not copied into config
        assert!(oracle.options.get("api_key").is_none());
    }

    #[test]
    fn test_env_blank_api_key_leaves_oracle_off() {
        let mut vars = JOGET_VARS.to_vec();
        vars.push(("OPENAI_API_KEY", "  "));

        let config = AnalyzerConfig::from_lookup(lookup(&vars)).unwrap();
        assert!(config.oracle.is_none());
    }

    #[test]
    fn test_env_missing_required() {
        let result = AnalyzerConfig::from_lookup(lookup(&JOGET_VARS[..2]));
        assert!(matches!(
            result,
            Err(ConfigError::MissingEnvVar(ref v)) if v == "JOGET_TRAMITE_FORM_ID"
        ));
    }

    #[test]
    fn test_env_invalid_temperature() {
        let mut vars = JOGET_VARS.to_vec();
        vars.push(("LLM_PROVIDER", "openai"));
        vars.push(("LLM_TEMPERATURE", "warm"));

        assert!(matches!(
            AnalyzerConfig::from_lookup(lookup(&vars)),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
