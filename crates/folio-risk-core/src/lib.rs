//! # folio-risk-core
//!
//! Deterministic risk scoring for insurance workflow folios.
//!
//! This crate answers, without any I/O:
//! - What does a raw form-service record mean as a typed folio?
//! - What baseline risk do the fixed heuristics assign it?
//! - How does an oracle's free-text response change that baseline?
//! - What does the final report look like?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same folio and signals always produce the same baseline
//! 2. **No network calls**: The oracle is consulted by `folio-risk-runtime`;
//!    this crate only interprets its text
//! 3. **Bounded**: Every score is clamped to `[0.0, 1.0]`
//! 4. **Lenient with the oracle**: Malformed oracle output never fails scoring
//!
//! ## Example
//!
//! ```rust,ignore
//! use folio_risk_core::{apply_adjustment, heuristic_score, render_report, Adjustment, Folio, Signals};
//!
//! let folio = Folio::from_raw(&raw_record)?;
//! let signals = Signals::from_folio(&folio);
//! let baseline = heuristic_score(&folio, &signals);
//! let risk = apply_adjustment(&baseline, Adjustment::from_response(&oracle_text));
//! println!("{}", render_report(&folio, &signals, &risk));
//! ```

pub mod adjustment;
pub mod folio;
pub mod patterns;
pub mod report;
pub mod scoring;
pub mod signals;
pub mod types;

// Re-export main types at crate root
pub use adjustment::{
    apply_adjustment, Adjustment, OracleVerdict, VerdictError, FALLBACK_RECOMMENDATION,
};
pub use folio::{Document, Folio, FolioBuilder, FolioError};
pub use report::render_report;
pub use scoring::{heuristic_score, HeuristicScorer, RuleHit, ScoringRule};
pub use signals::Signals;
pub use types::{RiskAssessment, RiskLevel};

/// Score a folio without any oracle: heuristic baseline plus diagnostics.
///
/// Equivalent to the adjustment step with no oracle configured.
pub fn assess(folio: &Folio, signals: &Signals) -> RiskAssessment {
    apply_adjustment(&heuristic_score(folio, signals), Adjustment::None)
}
