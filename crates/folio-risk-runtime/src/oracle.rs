//! Scoring oracle: an external, free-text-returning risk opinion.
//!
//! The oracle is a capability: structured payload in, raw text out. What the
//! text means is decided by [`folio_risk_core::Adjustment`]; this module
//! only moves bytes.

use async_trait::async_trait;
use folio_risk_core::{Folio, RiskAssessment, Signals};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::config::OracleConfig;
use crate::prompts::oracle_messages;
use crate::providers::{CompletionConfig, LlmProvider, ProviderError, ProviderRegistry};

/// Errors from invoking the oracle. Unlike unparseable responses, these
/// abort the analysis.
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Oracle provider failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Failed to serialize oracle payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// What the oracle is asked about.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OraclePayload<'a> {
    pub folio: &'a Folio,
    pub signals: &'a Signals,
    pub baseline: &'a RiskAssessment,
}

/// An injectable text-in, text-out risk oracle.
#[async_trait]
pub trait ScoringOracle: Send + Sync {
    /// Ask the oracle about a payload, returning its raw answer.
    async fn invoke(&self, payload: &OraclePayload<'_>) -> Result<String, OracleError>;

    /// Oracle name for logs.
    fn name(&self) -> &str;
}

/// Oracle backed by an LLM provider.
pub struct LlmOracle {
    provider: Arc<dyn LlmProvider>,
    completion: CompletionConfig,
}

impl LlmOracle {
    pub fn new(provider: Arc<dyn LlmProvider>, completion: CompletionConfig) -> Self {
        Self {
            provider,
            completion,
        }
    }

    /// Build an oracle from config, creating the provider through `registry`.
    pub fn from_config(
        config: &OracleConfig,
        registry: &ProviderRegistry,
    ) -> Result<Self, OracleError> {
        let provider = registry.create(&config.provider, &config.options)?;
        let completion = CompletionConfig {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: config.timeout,
        };
        Ok(Self::new(provider, completion))
    }

    pub fn completion_config(&self) -> &CompletionConfig {
        &self.completion
    }
}

impl std::fmt::Debug for LlmOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmOracle")
            .field("provider", &self.provider.name())
            .field("completion", &self.completion)
            .finish()
    }
}

#[async_trait]
impl ScoringOracle for LlmOracle {
    async fn invoke(&self, payload: &OraclePayload<'_>) -> Result<String, OracleError> {
        let messages = oracle_messages(payload.folio, payload.signals, payload.baseline)?;
        let response = self.provider.complete(messages, &self.completion).await?;
        debug!(
            provider = self.provider.name(),
            model = %response.model,
            tokens = response.usage.total(),
            "oracle responded"
        );
        Ok(response.content)
    }

    fn name(&self) -> &str {
        self.provider.name()
    }
}
