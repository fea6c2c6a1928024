//! CI gate decision over an evaluation report.
//!
//! Suppressed and patched findings never fail the gate. Expired and
//! unmatched findings fail it when their severity is at or above the
//! configured threshold.

use serde::Serialize;

use crate::models::finding::{Classification, EvaluatedFinding, SeverityLevel};
use crate::models::report::EvaluationReport;

/// Outcome of gating a run.
#[derive(Debug, Clone, Serialize)]
pub struct GateDecision {
    pub passed: bool,
    pub threshold: SeverityLevel,
    /// The expired/unmatched findings at or above the threshold.
    pub failing: Vec<EvaluatedFinding>,
}

impl GateDecision {
    pub fn exit_code(&self) -> i32 {
        if self.passed {
            0
        } else {
            1
        }
    }
}

/// Whether a classification is one the gate acts on.
fn gates(classification: &Classification) -> bool {
    matches!(
        classification,
        Classification::Expired { .. } | Classification::Unmatched
    )
}

/// Decide the gate for a report at the given severity threshold.
pub fn decide(report: &EvaluationReport, threshold: SeverityLevel) -> GateDecision {
    let failing: Vec<EvaluatedFinding> = report
        .results
        .iter()
        .filter(|ef| {
            gates(&ef.classification) && ef.finding.severity.weight() >= threshold.weight()
        })
        .cloned()
        .collect();

    GateDecision {
        passed: failing.is_empty(),
        threshold,
        failing,
    }
}
