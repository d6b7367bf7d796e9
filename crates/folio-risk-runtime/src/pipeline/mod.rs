//! Four-stage analysis pipeline: fetch, enrich, score, render.
//!
//! Stages run strictly in [`Stage::ORDER`], each to completion before the
//! next starts. The first failing stage halts the run and its error is the
//! only thing returned; there are no partial results and no retries.

mod state;

pub use state::{PipelineState, StateUpdate};

use folio_risk_core::signals::{CATALOG_LINE, ESTATUS};
use folio_risk_core::{heuristic_score, render_report, Folio, RiskAssessment, Signals};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::AnalyzerConfig;
use crate::gate::AdjustmentGate;
use crate::oracle::{LlmOracle, OracleError, ScoringOracle};
use crate::providers::ProviderRegistry;
use crate::source::{FetchError, FolioSource, JogetClient};

/// Errors that abort an analysis.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// A stage ran without the state an earlier stage should have produced.
    #[error("Internal error in {stage} stage: {message}")]
    Internal { stage: Stage, message: String },

    #[error("Pipeline not configured: {0}")]
    NotConfigured(String),
}

impl PipelineError {
    /// True for invariant violations, as opposed to failures caused by
    /// input or by external services.
    pub fn is_internal(&self) -> bool {
        matches!(self, PipelineError::Internal { .. })
    }

    fn missing(stage: Stage, field: &str) -> Self {
        PipelineError::Internal {
            stage,
            message: format!("{} is not set", field),
        }
    }
}

/// Pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Fetch,
    Enrich,
    Score,
    Render,
}

impl Stage {
    /// The only order stages ever run in.
    pub const ORDER: [Stage; 4] = [Stage::Fetch, Stage::Enrich, Stage::Score, Stage::Render];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Enrich => "enrich",
            Stage::Score => "score",
            Stage::Render => "render",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful analysis.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalysisResult {
    pub id: String,
    pub folio: Option<Folio>,
    pub signals: Signals,
    pub risk: RiskAssessment,
    pub report: String,
}

impl AnalysisResult {
    fn from_state(state: PipelineState) -> Result<Self, PipelineError> {
        Ok(Self {
            risk: state
                .risk
                .ok_or_else(|| PipelineError::missing(Stage::Render, "risk"))?,
            report: state
                .report
                .ok_or_else(|| PipelineError::missing(Stage::Render, "report"))?,
            id: state.id,
            folio: state.folio,
            signals: state.signals,
        })
    }
}

/// Runs analyses. Holds only shared, long-lived clients, so one pipeline
/// can serve many concurrent analyses.
pub struct Pipeline {
    source: Arc<dyn FolioSource>,
    gate: AdjustmentGate,
}

impl Pipeline {
    pub fn new(source: Arc<dyn FolioSource>, gate: AdjustmentGate) -> Self {
        Self { source, gate }
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Wire the Joget client and, if configured, the LLM oracle.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, PipelineError> {
        let mut builder = Self::builder().source(Arc::new(JogetClient::new(&config.joget)?));
        match &config.oracle {
            Some(oracle_config) => {
                let oracle =
                    LlmOracle::from_config(oracle_config, &ProviderRegistry::with_defaults())?;
                info!(
                    provider = %oracle_config.provider,
                    model = %oracle_config.model,
                    "scoring oracle configured"
                );
                builder = builder.oracle(Arc::new(oracle));
            }
            None => info!("no scoring oracle configured; scores are heuristic only"),
        }
        builder.build()
    }

    /// Analyze one folio end to end.
    pub async fn run(&self, id: &str) -> Result<AnalysisResult, PipelineError> {
        info!(folio = %id, source = self.source.name(), "analysis started");
        let mut state = PipelineState::new(id);

        for stage in Stage::ORDER {
            debug!(folio = %id, stage = %stage, "stage started");
            let update = match self.execute(stage, &state).await {
                Ok(update) => update,
                Err(e) => {
                    error!(folio = %id, stage = %stage, error = %e, "analysis failed");
                    return Err(e);
                }
            };
            state = state.merge(update);
        }

        let result = AnalysisResult::from_state(state)?;
        info!(
            folio = %id,
            score = result.risk.score,
            level = %result.risk.level,
            "analysis finished"
        );
        Ok(result)
    }

    async fn execute(&self, stage: Stage, state: &PipelineState) -> Result<StateUpdate, PipelineError> {
        match stage {
            Stage::Fetch => self.fetch(state).await,
            Stage::Enrich => Ok(enrich(state)),
            Stage::Score => self.score(state).await,
            Stage::Render => render(state),
        }
    }

    async fn fetch(&self, state: &PipelineState) -> Result<StateUpdate, PipelineError> {
        let folio = self.source.fetch_folio(&state.id).await?;
        let signals = Signals::from_folio(&folio);
        Ok(StateUpdate::default().folio(folio).signals(signals))
    }

    async fn score(&self, state: &PipelineState) -> Result<StateUpdate, PipelineError> {
        let folio = state
            .folio
            .as_ref()
            .ok_or_else(|| PipelineError::missing(Stage::Score, "folio"))?;

        let baseline = heuristic_score(folio, &state.signals);
        debug!(folio = %state.id, baseline = baseline.score, "heuristic baseline");

        let risk = self.gate.adjust(&baseline, folio, &state.signals).await?;
        Ok(StateUpdate::default().risk(risk))
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("source", &self.source.name())
            .field("gate", &self.gate)
            .finish()
    }
}

fn enrich(state: &PipelineState) -> StateUpdate {
    let mut signals = state.signals.clone();
    if let Some(folio) = &state.folio {
        if let Some(line) = folio.catalog_line() {
            signals.insert(CATALOG_LINE, JsonValue::String(line.to_string()));
        }
        if let Some(estatus) = folio.estatus() {
            signals.insert(ESTATUS, JsonValue::String(estatus.to_string()));
        }
    }
    StateUpdate::default().signals(signals)
}

fn render(state: &PipelineState) -> Result<StateUpdate, PipelineError> {
    let folio = state
        .folio
        .as_ref()
        .ok_or_else(|| PipelineError::missing(Stage::Render, "folio"))?;
    let risk = state
        .risk
        .as_ref()
        .ok_or_else(|| PipelineError::missing(Stage::Render, "risk"))?;

    Ok(StateUpdate::default().report(render_report(folio, &state.signals, risk)))
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    source: Option<Arc<dyn FolioSource>>,
    oracle: Option<Arc<dyn ScoringOracle>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the folio source.
    pub fn source(mut self, source: Arc<dyn FolioSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the scoring oracle. Without one, scores are purely heuristic.
    pub fn oracle(mut self, oracle: Arc<dyn ScoringOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn build(self) -> Result<Pipeline, PipelineError> {
        let source = self
            .source
            .ok_or_else(|| PipelineError::NotConfigured("No folio source set".to_string()))?;
        let gate = match self.oracle {
            Some(oracle) => AdjustmentGate::with_oracle(oracle),
            None => AdjustmentGate::new(),
        };
        Ok(Pipeline::new(source, gate))
    }
}
