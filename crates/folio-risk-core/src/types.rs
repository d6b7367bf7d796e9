//! Core types for risk assessments.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Score at or above which a folio is high risk.
pub const HIGH_THRESHOLD: f64 = 0.7;

/// Score at or above which a folio is medium risk.
pub const MEDIUM_THRESHOLD: f64 = 0.4;

/// Discrete risk level derived from a score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Bajo,
    Medio,
    Alto,
}

impl RiskLevel {
    /// Derive the level from a score: `>= 0.7` alto, `>= 0.4` medio, else bajo.
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_THRESHOLD {
            RiskLevel::Alto
        } else if score >= MEDIUM_THRESHOLD {
            RiskLevel::Medio
        } else {
            RiskLevel::Bajo
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Bajo => "bajo",
            RiskLevel::Medio => "medio",
            RiskLevel::Alto => "alto",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clamp a score into `[0.0, 1.0]`.
pub fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 1.0)
}

/// A risk assessment for one folio.
///
/// `baseline_score` and `llm_delta` are diagnostics set only once the
/// adjustment step has run; a purely heuristic assessment leaves them empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    /// Final score, always within `[0.0, 1.0]`
    pub score: f64,

    /// Level derived from `score`
    pub level: RiskLevel,

    /// Human-readable justification
    pub rationale: String,

    /// Ordered, append-only recommendations
    pub recommendations: Vec<String>,

    /// Heuristic score before any adjustment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_score: Option<f64>,

    /// Adjustment actually added to the baseline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_delta: Option<f64>,
}

impl RiskAssessment {
    /// Build an assessment, clamping the score and deriving the level.
    pub fn new(score: f64, rationale: impl Into<String>, recommendations: Vec<String>) -> Self {
        let score = clamp_score(score);
        Self {
            score,
            level: RiskLevel::from_score(score),
            rationale: rationale.into(),
            recommendations,
            baseline_score: None,
            llm_delta: None,
        }
    }

    /// The pre-adjustment score, or the score itself when no adjustment ran.
    pub fn baseline(&self) -> f64 {
        self.baseline_score.unwrap_or(self.score)
    }

    /// The applied adjustment, zero when none ran.
    pub fn delta(&self) -> f64 {
        self.llm_delta.unwrap_or(0.0)
    }
}
