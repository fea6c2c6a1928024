//! Policy-load error taxonomy.
//!
//! Every variant carries enough context (finding id, field) for a human to
//! fix the source document. Once a policy has validated, per-finding
//! evaluation never errors: no match and expired match are normal
//! classification outcomes.

use chrono::{DateTime, Utc};

/// Errors raised while loading and validating a policy document.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("unsupported policy schema version '{found}', expected '{expected}'")]
    UnsupportedVersion {
        found: String,
        expected: &'static str,
    },

    #[error("malformed policy for finding '{finding_id}', field '{field}': {message}")]
    MalformedPolicy {
        finding_id: String,
        field: String,
        message: String,
    },

    #[error(
        "invalid time range for finding '{finding_id}' pattern '{pattern}': \
         expires {expires} is not after created {created}"
    )]
    InvalidTimeRange {
        finding_id: String,
        pattern: String,
        created: DateTime<Utc>,
        expires: DateTime<Utc>,
    },

    #[error("failed to read policy document: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse policy document: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl PolicyError {
    /// Whether this error means the document failed schema validation
    /// (as opposed to an internally inconsistent rule or an I/O failure).
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MalformedPolicy { .. } | Self::UnsupportedVersion { .. } | Self::Yaml(_)
        )
    }

    pub fn is_invalid_time_range(&self) -> bool {
        matches!(self, Self::InvalidTimeRange { .. })
    }
}
