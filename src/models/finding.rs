//! Core finding model and classification outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// -- Severity --

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl SeverityLevel {
    /// Numeric weight for threshold comparison (0.0–1.0 scale).
    pub fn weight(&self) -> f32 {
        match self {
            Self::Critical => 1.0,
            Self::High => 0.8,
            Self::Medium => 0.5,
            Self::Low => 0.2,
            Self::Info => 0.0,
        }
    }

    /// Parse a scanner or CLI severity string, case-insensitively.
    pub fn parse_loose(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "critical" => Some(Self::Critical),
            "high" => Some(Self::High),
            "medium" | "moderate" => Some(Self::Medium),
            "low" => Some(Self::Low),
            "info" | "informational" => Some(Self::Info),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Info => "info",
        }
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// -- Finding --

/// A detected vulnerability instance as emitted by an external scanner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Finding {
    /// Scanner-assigned vulnerability identifier.
    pub finding_id: String,
    /// Affected-component descriptor: a package coordinate or a
    /// `>`-separated dependency path.
    pub component: String,
    pub severity: SeverityLevel,
    pub title: Option<String>,
}

// -- Classification --

/// Outcome of evaluating one finding against the suppression policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Classification {
    /// An ignore rule currently covers this finding. Carries the winning
    /// rule's justification for audit logging.
    Suppressed {
        reason: String,
        rule_created: DateTime<Utc>,
        expires: Option<DateTime<Utc>>,
    },
    /// Ignore rules matched but every one of them has lapsed. The finding
    /// must be surfaced again; `expired_at` is the most recent lapse.
    Expired {
        reason: String,
        expired_at: DateTime<Utc>,
    },
    /// Resolved at the source level by an applied patch, not hidden.
    Patched,
    /// No rule or patch entry applies; passed through to the sink unmodified.
    Unmatched,
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Suppressed { .. } => "suppressed",
            Self::Expired { .. } => "expired",
            Self::Patched => "patched",
            Self::Unmatched => "unmatched",
        }
    }
}

/// A finding paired with its classification and stable fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluatedFinding {
    pub finding: Finding,
    pub classification: Classification,
    pub fingerprint: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_weight_ordering() {
        assert!(SeverityLevel::Critical.weight() > SeverityLevel::High.weight());
        assert!(SeverityLevel::High.weight() > SeverityLevel::Medium.weight());
        assert!(SeverityLevel::Medium.weight() > SeverityLevel::Low.weight());
        assert!(SeverityLevel::Low.weight() > SeverityLevel::Info.weight());
        assert_eq!(SeverityLevel::Info.weight(), 0.0);
    }

    #[test]
    fn severity_parse_loose_accepts_case_variants() {
        assert_eq!(
            SeverityLevel::parse_loose("CRITICAL"),
            Some(SeverityLevel::Critical)
        );
        assert_eq!(
            SeverityLevel::parse_loose("Moderate"),
            Some(SeverityLevel::Medium)
        );
        assert_eq!(SeverityLevel::parse_loose("bogus"), None);
    }

    #[test]
    fn severity_serialization() {
        let json = serde_json::to_string(&SeverityLevel::High).unwrap();
        assert_eq!(json, "\"high\"");
        let parsed: SeverityLevel = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(parsed, SeverityLevel::Critical);
    }

    #[test]
    fn classification_serializes_with_status_tag() {
        let c = Classification::Suppressed {
            reason: "not exploitable".to_string(),
            rule_created: "2024-01-01T00:00:00Z".parse().unwrap(),
            expires: None,
        };
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["status"], "suppressed");
        assert_eq!(json["reason"], "not exploitable");
        assert!(json["expires"].is_null());
    }

    #[test]
    fn classification_labels() {
        assert_eq!(Classification::Patched.label(), "patched");
        assert_eq!(Classification::Unmatched.label(), "unmatched");
    }

    #[test]
    fn finding_round_trip() {
        let f = Finding {
            finding_id: "SNYK-JS-LODASH-567746".to_string(),
            component: "lodash".to_string(),
            severity: SeverityLevel::High,
            title: Some("Prototype Pollution".to_string()),
        };
        let json = serde_json::to_string(&f).unwrap();
        let back: Finding = serde_json::from_str(&json).unwrap();
        assert_eq!(back, f);
    }
}
