//! Immutable state threaded through the pipeline stages.

use folio_risk_core::{Folio, RiskAssessment, Signals};

/// Everything known about one analysis so far.
///
/// Stages never mutate a state: they return a [`StateUpdate`] and the
/// pipeline merges it into a new state value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineState {
    pub id: String,
    pub folio: Option<Folio>,
    pub signals: Signals,
    pub risk: Option<RiskAssessment>,
    pub report: Option<String>,
}

impl PipelineState {
    /// Initial state for an analysis of `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Apply a partial update, producing the next state. Fields left empty
    /// in the update keep their current value.
    #[must_use]
    pub fn merge(self, update: StateUpdate) -> Self {
        Self {
            id: self.id,
            folio: update.folio.or(self.folio),
            signals: update.signals.unwrap_or(self.signals),
            risk: update.risk.or(self.risk),
            report: update.report.or(self.report),
        }
    }
}

/// Partial output of one stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub folio: Option<Folio>,
    pub signals: Option<Signals>,
    pub risk: Option<RiskAssessment>,
    pub report: Option<String>,
}

impl StateUpdate {
    pub fn folio(mut self, folio: Folio) -> Self {
        self.folio = Some(folio);
        self
    }

    pub fn signals(mut self, signals: Signals) -> Self {
        self.signals = Some(signals);
        self
    }

    pub fn risk(mut self, risk: RiskAssessment) -> Self {
        self.risk = Some(risk);
        self
    }

    pub fn report(mut self, report: String) -> Self {
        self.report = Some(report);
        self
    }
}
