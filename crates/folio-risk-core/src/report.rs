//! Text report for a scored folio.
//!
//! Pure formatting: line order is fixed and optional lines are omitted
//! rather than left blank.

use crate::folio::Folio;
use crate::signals::Signals;
use crate::types::RiskAssessment;

/// Render the report for a folio, its signals and final assessment.
pub fn render_report(folio: &Folio, signals: &Signals, risk: &RiskAssessment) -> String {
    let mut lines = vec![
        format!("Folio **{}**", folio.id()),
        format!(
            "Nivel de riesgo: **{}** ({:.2}) {}",
            risk.level.as_str().to_uppercase(),
            risk.score,
            breakdown(risk)
        ),
        format!("Motivo: {}", risk.rationale),
    ];

    let missing = signals.missing_docs();
    if !missing.is_empty() {
        lines.push(format!("Documentos faltantes: {}", missing.join(", ")));
    }

    if !risk.recommendations.is_empty() {
        lines.push("Recomendaciones:".to_string());
        lines.extend(risk.recommendations.iter().map(|r| format!("- {}", r)));
    }

    lines.join("\n")
}

fn breakdown(risk: &RiskAssessment) -> String {
    let delta = risk.delta();
    if delta == 0.0 {
        format!("[Heuristic: {:.2}]", risk.baseline())
    } else {
        format!("[Heuristic: {:.2} + LLM: {:+.2}]", risk.baseline(), delta)
    }
}
