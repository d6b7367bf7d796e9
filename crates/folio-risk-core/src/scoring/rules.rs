//! The four heuristic rules.

use crate::folio::Folio;
use crate::signals::Signals;

use super::{RuleHit, ScoringRule};

/// Lines considered critical, compared lowercase.
pub const CRITICAL_LINES: [&str; 2] = ["daños", "vida"];

/// Premium at or above which a critical line is high exposure.
pub const CRITICAL_PREMIUM: f64 = 1_000_000.0;

/// Increment per missing document.
pub const MISSING_DOC_STEP: f64 = 0.05;

/// Maximum total increment for missing documents.
pub const MISSING_DOC_CAP: f64 = 0.15;

/// High premium in a critical line.
pub struct CriticalLineRule;

impl ScoringRule for CriticalLineRule {
    fn name(&self) -> &'static str {
        "critical_line"
    }

    fn apply(&self, folio: &Folio, _signals: &Signals) -> Option<RuleHit> {
        let ramo = folio.ramo().to_lowercase();
        if !CRITICAL_LINES.contains(&ramo.as_str()) || folio.monto_prima() < CRITICAL_PREMIUM {
            return None;
        }
        Some(RuleHit {
            increment: 0.6,
            recommendation: "Validar exposición por monto alto en ramo crítico".to_string(),
        })
    }
}

/// Reinsurance required.
pub struct ReinsuranceRule;

impl ScoringRule for ReinsuranceRule {
    fn name(&self) -> &'static str {
        "reinsurance"
    }

    fn apply(&self, folio: &Folio, _signals: &Signals) -> Option<RuleHit> {
        folio.requiere_reaseguro().then(|| RuleHit {
            increment: 0.25,
            recommendation: "Confirmar capacidad de reasegurador".to_string(),
        })
    }
}

/// Required documents not uploaded. Counted from the folio itself, not from
/// the `missing_docs` signal.
pub struct MissingDocumentsRule;

impl ScoringRule for MissingDocumentsRule {
    fn name(&self) -> &'static str {
        "missing_documents"
    }

    fn apply(&self, folio: &Folio, _signals: &Signals) -> Option<RuleHit> {
        let missing = folio.missing_document_count();
        if missing == 0 {
            return None;
        }
        Some(RuleHit {
            increment: MISSING_DOC_CAP.min(missing as f64 * MISSING_DOC_STEP),
            recommendation: format!("Solicitar {} documentos faltantes", missing),
        })
    }
}

/// Folio flagged urgent. Only an explicit `true` counts.
pub struct UrgencyRule;

impl ScoringRule for UrgencyRule {
    fn name(&self) -> &'static str {
        "urgency"
    }

    fn apply(&self, folio: &Folio, _signals: &Signals) -> Option<RuleHit> {
        (folio.es_urgente() == Some(true)).then(|| RuleHit {
            increment: 0.1,
            recommendation: "Priorizar folio urgente en cola".to_string(),
        })
    }
}
