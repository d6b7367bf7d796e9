//! Folding an oracle's proposed adjustment into a baseline assessment.
//!
//! The oracle returns free text. Parsing is all-or-nothing: either every
//! field it supplied is well-typed and the verdict is applied, or the whole
//! response is discarded, the baseline is kept, and a fixed advisory
//! recommendation is appended.
//!
//! The oracle is asked for a delta within `-0.2..=0.4` but the range is not
//! enforced here. Only the final combined score is clamped.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::patterns::strip_code_fence;
use crate::types::{clamp_score, RiskAssessment, RiskLevel};

/// Appended when the oracle's response cannot be interpreted.
pub const FALLBACK_RECOMMENDATION: &str = "LLM no devolvió JSON válido; se conserva baseline";

/// Why an oracle response was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VerdictError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("delta is not numeric: {0}")]
    InvalidDelta(String),

    #[error("rationale is not a string")]
    InvalidRationale,

    #[error("recommendations is not a list of strings")]
    InvalidRecommendations,
}

/// A well-formed oracle response.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleVerdict {
    /// Proposed adjustment, `0.0` when the key is absent
    pub delta: f64,

    /// Replacement rationale, if supplied
    pub rationale: Option<String>,

    /// Extra recommendations to append
    pub recommendations: Vec<String>,
}

impl OracleVerdict {
    /// Parse oracle text, tolerating an enclosing markdown code fence.
    pub fn parse(raw: &str) -> Result<Self, VerdictError> {
        let body = strip_code_fence(raw);
        let value: Value =
            serde_json::from_str(body).map_err(|e| VerdictError::InvalidJson(e.to_string()))?;
        let object = value.as_object().ok_or(VerdictError::NotAnObject)?;

        Ok(Self {
            delta: parse_delta(object)?,
            rationale: parse_rationale(object)?,
            recommendations: parse_recommendations(object)?,
        })
    }
}

fn parse_delta(object: &Map<String, Value>) -> Result<f64, VerdictError> {
    let delta = match object.get("delta") {
        None => return Ok(0.0),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match delta {
        Some(d) if d.is_finite() => Ok(d),
        _ => Err(VerdictError::InvalidDelta(
            object.get("delta").map(Value::to_string).unwrap_or_default(),
        )),
    }
}

fn parse_rationale(object: &Map<String, Value>) -> Result<Option<String>, VerdictError> {
    match object.get("rationale") {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(VerdictError::InvalidRationale),
    }
}

fn parse_recommendations(object: &Map<String, Value>) -> Result<Vec<String>, VerdictError> {
    match object.get("recommendations") {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or(VerdictError::InvalidRecommendations)
            })
            .collect(),
        Some(_) => Err(VerdictError::InvalidRecommendations),
    }
}

/// What the oracle contributed to an assessment.
#[derive(Debug, Clone, PartialEq)]
pub enum Adjustment {
    /// No oracle configured
    None,

    /// Oracle responded with a usable verdict
    Applied(OracleVerdict),

    /// Oracle responded with something unusable
    Rejected(VerdictError),
}

impl Adjustment {
    /// Interpret raw oracle text.
    pub fn from_response(raw: &str) -> Self {
        match OracleVerdict::parse(raw) {
            Ok(verdict) => Adjustment::Applied(verdict),
            Err(e) => {
                tracing::warn!(error = %e, "oracle response rejected, keeping baseline");
                Adjustment::Rejected(e)
            }
        }
    }
}

/// Combine a baseline with an adjustment.
///
/// The result carries `baseline_score` (the untouched baseline) and
/// `llm_delta` (the delta actually added, `0.0` when none was).
pub fn apply_adjustment(baseline: &RiskAssessment, adjustment: Adjustment) -> RiskAssessment {
    let mut rationale = baseline.rationale.clone();
    let mut recommendations = baseline.recommendations.clone();
    let mut delta = 0.0;

    match adjustment {
        Adjustment::None => {}
        Adjustment::Applied(verdict) => {
            delta = verdict.delta;
            if let Some(r) = verdict.rationale {
                rationale = r;
            }
            recommendations.extend(verdict.recommendations);
        }
        Adjustment::Rejected(_) => {
            recommendations.push(FALLBACK_RECOMMENDATION.to_string());
        }
    }

    let score = clamp_score(baseline.score + delta);
    RiskAssessment {
        score,
        level: RiskLevel::from_score(score),
        rationale,
        recommendations,
        baseline_score: Some(baseline.score),
        llm_delta: Some(delta),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline(score: f64) -> RiskAssessment {
        RiskAssessment::new(score, "baseline", vec!["Confirmar capacidad de reasegurador".into()])
    }

    #[test]
    fn test_no_oracle_passes_through() {
        let result = apply_adjustment(&baseline(0.45), Adjustment::None);

        assert_eq!(result.score, 0.45);
        assert_eq!(result.level, RiskLevel::Medio);
        assert_eq!(result.rationale, "baseline");
        assert_eq!(result.recommendations.len(), 1);
        assert_eq!(result.baseline_score, Some(0.45));
        assert_eq!(result.llm_delta, Some(0.0));
    }

    #[test]
    fn test_delta_applied_and_clamped() {
        let adjustment = Adjustment::from_response(r#"{"delta": 0.4}"#);
        let result = apply_adjustment(&baseline(0.9), adjustment);

        assert_eq!(result.score, 1.0);
        assert_eq!(result.level, RiskLevel::Alto);
        assert_eq!(result.llm_delta, Some(0.4));
        assert_eq!(result.baseline_score, Some(0.9));
    }

    #[test]
    fn test_negative_delta_clamps_at_zero() {
        let adjustment = Adjustment::from_response(r#"{"delta": -0.2}"#);
        let result = apply_adjustment(&baseline(0.1), adjustment);

        assert_eq!(result.score, 0.0);
        assert_eq!(result.level, RiskLevel::Bajo);
        assert_eq!(result.llm_delta, Some(-0.2));
    }

    #[test]
    fn test_out_of_range_delta_not_clamped_independently() {
        let verdict = OracleVerdict::parse(r#"{"delta": -0.9}"#).unwrap();
        assert_eq!(verdict.delta, -0.9);

        let result = apply_adjustment(&baseline(1.0), Adjustment::Applied(verdict));
        assert!((result.score - 0.1).abs() < 1e-12);
        assert_eq!(result.llm_delta, Some(-0.9));
    }

    #[test]
    fn test_level_rederived_from_final_score() {
        let adjustment = Adjustment::from_response(r#"{"delta": 0.3}"#);
        let result = apply_adjustment(&baseline(0.45), adjustment);
        assert_eq!(result.level, RiskLevel::Alto);
    }

    #[test]
    fn test_rationale_replaced_and_recommendations_extended() {
        let raw = r#"{"delta": 0.1, "rationale": "x", "recommendations": ["a", "b"]}"#;
        let result = apply_adjustment(&baseline(0.2), Adjustment::from_response(raw));

        assert_eq!(result.rationale, "x");
        assert_eq!(
            result.recommendations,
            vec!["Confirmar capacidad de reasegurador", "a", "b"]
        );
    }

    #[test]
    fn test_missing_keys_default() {
        let verdict = OracleVerdict::parse("{}").unwrap();
        assert_eq!(verdict.delta, 0.0);
        assert_eq!(verdict.rationale, None);
        assert!(verdict.recommendations.is_empty());
    }

    #[test]
    fn test_not_json_falls_back() {
        let base = baseline(0.45);
        let result = apply_adjustment(&base, Adjustment::from_response("not json"));

        assert_eq!(result.score, base.score);
        assert_eq!(result.level, base.level);
        assert_eq!(result.rationale, base.rationale);
        assert_eq!(result.llm_delta, Some(0.0));
        assert_eq!(result.recommendations.len(), base.recommendations.len() + 1);
        assert_eq!(result.recommendations.last().unwrap(), FALLBACK_RECOMMENDATION);
    }

    #[test]
    fn test_fenced_response_matches_unfenced() {
        let fenced = "```json\n{\"delta\": 0.1, \"rationale\": \"x\", \"recommendations\": []}\n```";
        let plain = r#"{"delta": 0.1, "rationale": "x", "recommendations": []}"#;

        let a = OracleVerdict::parse(fenced).unwrap();
        let b = OracleVerdict::parse(plain).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.delta, 0.1);
    }

    #[test]
    fn test_numeric_string_delta() {
        let verdict = OracleVerdict::parse(r#"{"delta": "0.15"}"#).unwrap();
        assert_eq!(verdict.delta, 0.15);
    }

    #[test]
    fn test_rejections_discard_everything() {
        let cases = [
            (r#"{"delta": "alto", "rationale": "x"}"#, "InvalidDelta"),
            (r#"{"delta": null}"#, "InvalidDelta"),
            (r#"{"delta": true}"#, "InvalidDelta"),
            (r#"{"delta": 0.1, "rationale": 3}"#, "InvalidRationale"),
            (r#"{"delta": 0.1, "recommendations": "a"}"#, "InvalidRecommendations"),
            (r#"{"delta": 0.1, "recommendations": ["a", 1]}"#, "InvalidRecommendations"),
            (r#"[0.1]"#, "NotAnObject"),
        ];

        for (raw, kind) in cases {
            let result = apply_adjustment(&baseline(0.3), Adjustment::from_response(raw));
            assert_eq!(result.score, 0.3, "{} ({})", raw, kind);
            assert_eq!(result.rationale, "baseline", "{} ({})", raw, kind);
            assert_eq!(result.llm_delta, Some(0.0));
            assert_eq!(
                result.recommendations,
                vec!["Confirmar capacidad de reasegurador", FALLBACK_RECOMMENDATION]
            );
        }
    }
}
