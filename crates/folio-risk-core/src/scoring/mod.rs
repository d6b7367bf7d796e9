//! Heuristic scorer: deterministic baseline risk for a folio.
//!
//! The scorer applies a fixed, ordered list of rules. Each matching rule
//! adds an increment and appends one recommendation. Increments are summed
//! first and the total is clamped once; rules never clamp individually.
//!
//! ## Rules (in order)
//!
//! | Rule | Condition | Increment |
//! |------|-----------|-----------|
//! | Critical line exposure | ramo in {daños, vida} and prima >= 1,000,000 | 0.6 |
//! | Reinsurance | requiere_reaseguro | 0.25 |
//! | Missing documents | n required docs not uploaded, n > 0 | min(0.15, n * 0.05) |
//! | Urgency | es_urgente is exactly true | 0.1 |

mod rules;

pub use rules::{
    CriticalLineRule, MissingDocumentsRule, ReinsuranceRule, UrgencyRule, CRITICAL_LINES,
    CRITICAL_PREMIUM, MISSING_DOC_CAP, MISSING_DOC_STEP,
};

use crate::folio::Folio;
use crate::signals::Signals;
use crate::types::{clamp_score, RiskAssessment, RiskLevel};

/// Outcome of a rule that matched.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleHit {
    pub increment: f64,
    pub recommendation: String,
}

/// A single heuristic rule.
pub trait ScoringRule: Send + Sync {
    /// Short identifier for logging.
    fn name(&self) -> &'static str;

    /// Evaluate the rule, returning `None` when it does not apply.
    fn apply(&self, folio: &Folio, signals: &Signals) -> Option<RuleHit>;
}

/// The heuristic scorer.
///
/// Pure and total: the same folio and signals always yield a bit-identical
/// assessment, and no valid folio makes it fail.
pub struct HeuristicScorer {
    rules: Vec<Box<dyn ScoringRule>>,
}

impl HeuristicScorer {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(CriticalLineRule),
                Box::new(ReinsuranceRule),
                Box::new(MissingDocumentsRule),
                Box::new(UrgencyRule),
            ],
        }
    }

    /// Score a folio.
    pub fn score(&self, folio: &Folio, signals: &Signals) -> RiskAssessment {
        let mut score = 0.0;
        let mut recommendations = Vec::new();

        for rule in &self.rules {
            if let Some(hit) = rule.apply(folio, signals) {
                tracing::debug!(
                    folio = folio.id(),
                    rule = rule.name(),
                    increment = hit.increment,
                    "heuristic rule matched"
                );
                score += hit.increment;
                recommendations.push(hit.recommendation);
            }
        }

        let score = clamp_score(score);
        let level = RiskLevel::from_score(score);
        let rationale = build_rationale(folio, level);

        RiskAssessment {
            score,
            level,
            rationale,
            recommendations,
            baseline_score: None,
            llm_delta: None,
        }
    }
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Score a folio with the default rule set.
pub fn heuristic_score(folio: &Folio, signals: &Signals) -> RiskAssessment {
    HeuristicScorer::new().score(folio, signals)
}

fn build_rationale(folio: &Folio, level: RiskLevel) -> String {
    format!(
        "Riesgo {} generado por ramo {}, prima {:.2}, reaseguro {} y {} docs faltantes",
        level,
        folio.ramo(),
        folio.monto_prima(),
        if folio.requiere_reaseguro() { "sí" } else { "no" },
        folio.missing_document_count(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::folio::{Document, FolioBuilder};
    use proptest::prelude::*;

    fn base(ramo: &str, prima: f64) -> FolioBuilder {
        Folio::builder("WFE-123", ramo, "Emisión", prima)
    }

    fn missing_docs(n: usize) -> Vec<Document> {
        (0..n)
            .map(|i| Document::new(format!("Doc {}", i), true, false))
            .collect()
    }

    #[test]
    fn test_empty_folio_is_bajo() {
        let folio = base("Autos", 100.0).build().unwrap();
        let assessment = heuristic_score(&folio, &Signals::new());

        assert_eq!(assessment.score, 0.0);
        assert_eq!(assessment.level, RiskLevel::Bajo);
        assert!(assessment.recommendations.is_empty());
        assert_eq!(assessment.baseline_score, None);
        assert_eq!(assessment.llm_delta, None);
    }

    #[test]
    fn test_full_scenario_clamps_to_one() {
        let folio = base("Vida", 1_500_000.0)
            .requiere_reaseguro(true)
            .es_urgente(Some(true))
            .document(Document::new("Contrato", true, false))
            .document(Document::new("Carátula", true, false))
            .document(Document::new("INE", false, false))
            .build()
            .unwrap();
        let signals = Signals::from_folio(&folio);

        let assessment = heuristic_score(&folio, &signals);

        assert_eq!(assessment.score, 1.0);
        assert_eq!(assessment.level, RiskLevel::Alto);
        assert!(assessment.rationale.contains("2 docs faltantes"));
        assert_eq!(
            assessment.recommendations,
            vec![
                "Validar exposición por monto alto en ramo crítico",
                "Confirmar capacidad de reasegurador",
                "Solicitar 2 documentos faltantes",
                "Priorizar folio urgente en cola",
            ]
        );
    }

    #[test]
    fn test_critical_line_is_case_insensitive() {
        for ramo in ["DAÑOS", "daños", "Vida", "VIDA"] {
            let folio = base(ramo, 1_000_000.0).build().unwrap();
            let assessment = heuristic_score(&folio, &Signals::new());
            assert!((assessment.score - 0.6).abs() < 1e-12, "ramo {}", ramo);
            assert_eq!(assessment.level, RiskLevel::Medio);
        }
    }

    #[test]
    fn test_critical_line_below_threshold() {
        let folio = base("Vida", 999_999.99).build().unwrap();
        assert_eq!(heuristic_score(&folio, &Signals::new()).score, 0.0);
    }

    #[test]
    fn test_non_critical_line_with_high_premium() {
        let folio = base("Daños y Vida", 5_000_000.0).build().unwrap();
        assert_eq!(heuristic_score(&folio, &Signals::new()).score, 0.0);
    }

    #[test]
    fn test_missing_document_increment_is_capped() {
        let expected = [0.0, 0.05, 0.10, 0.15, 0.15, 0.15];
        for (n, want) in expected.iter().enumerate() {
            let folio = base("Autos", 0.0).documents(missing_docs(n)).build().unwrap();
            let assessment = heuristic_score(&folio, &Signals::new());
            assert!(
                (assessment.score - want).abs() < 1e-12,
                "{} missing docs gave {}",
                n,
                assessment.score
            );
            assert_eq!(assessment.recommendations.len(), usize::from(n > 0));
        }
    }

    #[test]
    fn test_urgency_requires_exact_true() {
        for (flag, want) in [(Some(true), 0.1), (Some(false), 0.0), (None, 0.0)] {
            let folio = base("Autos", 0.0).es_urgente(flag).build().unwrap();
            let assessment = heuristic_score(&folio, &Signals::new());
            assert!((assessment.score - want).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reinsurance_only_is_bajo() {
        let folio = base("Autos", 0.0).requiere_reaseguro(true).build().unwrap();
        let assessment = heuristic_score(&folio, &Signals::new());
        assert_eq!(assessment.score, 0.25);
        assert_eq!(assessment.level, RiskLevel::Bajo);
        assert!(assessment.rationale.contains("reaseguro sí"));
    }

    #[test]
    fn test_rationale_template() {
        let folio = base("Vida", 1_500_000.0).build().unwrap();
        let assessment = heuristic_score(&folio, &Signals::new());
        assert_eq!(
            assessment.rationale,
            "Riesgo medio generado por ramo Vida, prima 1500000.00, reaseguro no y 0 docs faltantes"
        );
    }

    proptest! {
        #[test]
        fn prop_score_in_range_and_level_consistent(
            critical in any::<bool>(),
            prima in 0.0f64..5_000_000.0,
            reaseguro in any::<bool>(),
            urgente in proptest::option::of(any::<bool>()),
            missing in 0usize..10,
            uploaded in 0usize..5,
        ) {
            let ramo = if critical { "Vida" } else { "Autos" };
            let mut docs = missing_docs(missing);
            docs.extend((0..uploaded).map(|i| Document::new(format!("Ok {}", i), true, true)));
            let folio = base(ramo, prima)
                .requiere_reaseguro(reaseguro)
                .es_urgente(urgente)
                .documents(docs)
                .build()
                .unwrap();
            let signals = Signals::from_folio(&folio);

            let first = heuristic_score(&folio, &signals);
            let second = heuristic_score(&folio, &signals);

            prop_assert!((0.0..=1.0).contains(&first.score));
            prop_assert_eq!(first.level, RiskLevel::from_score(first.score));
            prop_assert_eq!(first.score.to_bits(), second.score.to_bits());
            prop_assert_eq!(first, second);
        }
    }
}
