//! Evaluation report assembly.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::finding::EvaluatedFinding;
use crate::models::report::{ClassificationTotals, EvaluationReport};

/// Assemble the run report from classified findings and log the summary.
pub fn build(
    results: Vec<EvaluatedFinding>,
    policy_file: Option<String>,
    findings_file: Option<String>,
    started_at: DateTime<Utc>,
) -> EvaluationReport {
    let mut totals = ClassificationTotals::default();
    for result in &results {
        totals.record(&result.classification);
    }

    let report = EvaluationReport {
        run_id: Uuid::new_v4(),
        policy_file,
        findings_file,
        started_at,
        completed_at: Utc::now(),
        totals,
        results,
    };

    tracing::info!(
        run_id = %report.run_id,
        suppressed = report.totals.suppressed,
        expired = report.totals.expired,
        patched = report.totals.patched,
        unmatched = report.totals.unmatched,
        "policy evaluation complete"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::finding::{Classification, Finding, SeverityLevel};

    fn evaluated(classification: Classification) -> EvaluatedFinding {
        EvaluatedFinding {
            finding: Finding {
                finding_id: "VULN-1".to_string(),
                component: "lodash".to_string(),
                severity: SeverityLevel::High,
                title: None,
            },
            classification,
            fingerprint: "abc".to_string(),
        }
    }

    #[test]
    fn build_counts_classifications() {
        let started = Utc::now();
        let report = build(
            vec![
                evaluated(Classification::Unmatched),
                evaluated(Classification::Patched),
                evaluated(Classification::Unmatched),
            ],
            Some("policy.yaml".to_string()),
            None,
            started,
        );
        assert_eq!(report.totals.unmatched, 2);
        assert_eq!(report.totals.patched, 1);
        assert_eq!(report.totals.total(), 3);
        assert_eq!(report.started_at, started);
        assert!(report.completed_at >= started);
        assert_eq!(report.results.len(), 3);
    }

    #[test]
    fn run_ids_are_unique_per_build() {
        let a = build(vec![], None, None, Utc::now());
        let b = build(vec![], None, None, Utc::now());
        assert_ne!(a.run_id, b.run_id);
    }
}
