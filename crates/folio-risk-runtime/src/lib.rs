//! # folio-risk-runtime
//!
//! I/O side of folio risk analysis.
//!
//! `folio-risk-core` decides what a folio is worth; this crate gets the folio
//! and runs the analysis:
//! - fetches records from the Joget form service
//! - optionally consults an LLM scoring oracle
//! - drives the fetch → enrich → score → render pipeline
//!
//! Every client is built from an explicit [`AnalyzerConfig`]; nothing is
//! loaded into process-wide state.
//!
//! ## Example
//!
//! ```rust,ignore
//! use folio_risk_runtime::{AnalyzerConfig, Pipeline};
//!
//! let config = AnalyzerConfig::from_env()?;
//! let pipeline = Pipeline::from_config(&config)?;
//!
//! let result = pipeline.run("WFE-123").await?;
//! println!("{}", result.report);
//! ```

pub mod config;
pub mod gate;
pub mod oracle;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod secrets;
pub mod source;

pub use config::{AnalyzerConfig, ConfigError, JogetConfig, OracleConfig};
pub use gate::AdjustmentGate;
pub use oracle::{LlmOracle, OracleError, OraclePayload, ScoringOracle};
pub use pipeline::{AnalysisResult, Pipeline, PipelineBuilder, PipelineError, PipelineState, Stage};
pub use providers::{LlmProvider, ProviderError, ProviderRegistry};
pub use secrets::{ApiCredential, CredentialSource};
pub use source::{FetchError, FolioSource, JogetClient};
