//! Prompts for the scoring oracle.
//!
//! The system prompt is fixed. The user prompt embeds the folio, its
//! signals and the heuristic baseline, each serialized as compact JSON.

use folio_risk_core::{Folio, RiskAssessment, Signals};

use crate::providers::ChatMessage;

/// System prompt for the risk analyst role.
///
/// Advertises the delta range the model should stay within. The range is
/// advisory; only the combined score is clamped.
pub const SYSTEM_PROMPT: &str = "Eres un analista de riesgo. Devuelve JSON con keys delta \
(entre -0.2 y 0.4), rationale y recommendations. Considera señales y baseline.";

/// Render the user prompt: `Folio: ...\nSeñales: ...\nBaseline: ...`.
pub fn user_prompt(
    folio: &Folio,
    signals: &Signals,
    baseline: &RiskAssessment,
) -> Result<String, serde_json::Error> {
    Ok(format!(
        "Folio: {}\nSeñales: {}\nBaseline: {}",
        serde_json::to_string(folio)?,
        serde_json::to_string(signals)?,
        serde_json::to_string(baseline)?,
    ))
}

/// Full message list for one oracle call.
pub fn oracle_messages(
    folio: &Folio,
    signals: &Signals,
    baseline: &RiskAssessment,
) -> Result<Vec<ChatMessage>, serde_json::Error> {
    Ok(vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(user_prompt(folio, signals, baseline)?),
    ])
}
