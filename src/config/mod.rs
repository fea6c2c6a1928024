//! Evaluation configuration loaded from environment variables.
//!
//! CLI flags take precedence over the environment; both fall back to
//! defaults, so a bare `vulngate evaluate` run works without any setup.

use std::env;

use crate::models::finding::SeverityLevel;

/// How the loader treats an invalid ignore rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Reject the whole document (default).
    Strict,
    /// Skip the invalid rule with a warning. The rule never suppresses.
    Lenient,
}

#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Minimum severity at which expired or unmatched findings fail the gate.
    pub fail_level: SeverityLevel,
    pub validation: ValidationMode,
}

impl EvalConfig {
    pub fn from_env() -> Self {
        let fail_level = env::var("VULNGATE_FAIL_LEVEL")
            .ok()
            .and_then(|v| SeverityLevel::parse_loose(&v))
            .unwrap_or(SeverityLevel::Medium);

        let validation = match env::var("VULNGATE_VALIDATION").as_deref() {
            Ok("lenient") => ValidationMode::Lenient,
            _ => ValidationMode::Strict,
        };

        Self {
            fail_level,
            validation,
        }
    }
}
