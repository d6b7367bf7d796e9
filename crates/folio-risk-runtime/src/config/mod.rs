//! Analyzer configuration.
//!
//! Configuration is an explicit value handed to client constructors. It can
//! be loaded from a YAML file (validated against an embedded JSON Schema) or
//! from environment variables.

mod parser;
mod schema;

pub use parser::{
    AnalyzerConfig, ConfigError, JogetConfig, OracleConfig, DEFAULT_JOGET_TIMEOUT, DEFAULT_MODEL,
    DEFAULT_ORACLE_TIMEOUT, DEFAULT_PROVIDER,
};
pub use schema::validate_config_schema;
