//! Evaluation-run report model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::finding::{Classification, EvaluatedFinding};

/// Per-classification counts for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClassificationTotals {
    pub suppressed: usize,
    pub expired: usize,
    pub patched: usize,
    pub unmatched: usize,
}

impl ClassificationTotals {
    pub fn record(&mut self, classification: &Classification) {
        match classification {
            Classification::Suppressed { .. } => self.suppressed += 1,
            Classification::Expired { .. } => self.expired += 1,
            Classification::Patched => self.patched += 1,
            Classification::Unmatched => self.unmatched += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.suppressed + self.expired + self.patched + self.unmatched
    }
}

/// Summary of one evaluation run, with results in original finding order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub run_id: Uuid,
    pub policy_file: Option<String>,
    pub findings_file: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub totals: ClassificationTotals,
    pub results: Vec<EvaluatedFinding>,
}
