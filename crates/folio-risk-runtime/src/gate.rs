//! Adjustment gate: optionally let the oracle move the heuristic baseline.

use folio_risk_core::{apply_adjustment, Adjustment, Folio, RiskAssessment, Signals};
use std::sync::Arc;
use tracing::info;

use crate::oracle::{OracleError, OraclePayload, ScoringOracle};

/// Combines a baseline with the oracle's opinion, if an oracle is set.
///
/// Oracle transport failures are returned to the caller. Responses that
/// cannot be interpreted are absorbed: the baseline stands and a fallback
/// recommendation is appended.
#[derive(Clone, Default)]
pub struct AdjustmentGate {
    oracle: Option<Arc<dyn ScoringOracle>>,
}

impl AdjustmentGate {
    /// Gate with no oracle: every adjustment is zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_oracle(oracle: Arc<dyn ScoringOracle>) -> Self {
        Self {
            oracle: Some(oracle),
        }
    }

    pub fn has_oracle(&self) -> bool {
        self.oracle.is_some()
    }

    pub async fn adjust(
        &self,
        baseline: &RiskAssessment,
        folio: &Folio,
        signals: &Signals,
    ) -> Result<RiskAssessment, OracleError> {
        let adjustment = match &self.oracle {
            None => Adjustment::None,
            Some(oracle) => {
                let payload = OraclePayload {
                    folio,
                    signals,
                    baseline,
                };
                let raw = oracle.invoke(&payload).await?;
                info!(oracle = oracle.name(), folio = folio.id(), "oracle consulted");
                Adjustment::from_response(&raw)
            }
        };

        Ok(apply_adjustment(baseline, adjustment))
    }
}

impl std::fmt::Debug for AdjustmentGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdjustmentGate")
            .field("oracle", &self.oracle.as_ref().map(|o| o.name().to_string()))
            .finish()
    }
}
