//! The suppression classifier.
//!
//! `evaluate` is a pure function of the finding, the loaded policy, and an
//! injected reference time. It performs no I/O and never mutates the policy,
//! so batch evaluation is safe to run concurrently per finding; results are
//! kept in input order for deterministic reporting.

use chrono::{DateTime, Utc};

use crate::models::finding::{Classification, EvaluatedFinding, Finding};
use crate::models::policy::{IgnoreRule, PolicyDocument};
use crate::services::fingerprint;

/// Classify one finding against the policy at the reference time.
///
/// Precedence: a live ignore rule suppresses; matching rules that have all
/// lapsed surface the finding as expired; a patch entry marks it patched;
/// anything else passes through unmatched. When several rules match, the
/// most permissive wins: no expiry beats any expiry, a later expiry beats
/// an earlier one.
pub fn evaluate(
    finding: &Finding,
    policy: &PolicyDocument,
    now: DateTime<Utc>,
) -> Classification {
    let winner = policy
        .rules_for(&finding.finding_id)
        .iter()
        .filter(|rule| rule.matches_component(&finding.component))
        .max_by_key(|rule| rule.expires_at.unwrap_or(DateTime::<Utc>::MAX_UTC));

    if let Some(rule) = winner {
        return classify_matched(rule, now);
    }

    if policy.is_patched(&finding.finding_id) {
        return Classification::Patched;
    }

    Classification::Unmatched
}

fn classify_matched(rule: &IgnoreRule, now: DateTime<Utc>) -> Classification {
    match rule.expires_at {
        None => Classification::Suppressed {
            reason: rule.reason.clone(),
            rule_created: rule.created_at,
            expires: None,
        },
        Some(expires) if expires > now => Classification::Suppressed {
            reason: rule.reason.clone(),
            rule_created: rule.created_at,
            expires: Some(expires),
        },
        // Boundary case: expiry exactly equal to now resolves to Expired.
        Some(expires) => Classification::Expired {
            reason: rule.reason.clone(),
            expired_at: expires,
        },
    }
}

/// Classify a batch of findings, preserving input order.
pub fn evaluate_all(
    findings: &[Finding],
    policy: &PolicyDocument,
    now: DateTime<Utc>,
) -> Vec<EvaluatedFinding> {
    findings
        .iter()
        .map(|finding| {
            let classification = evaluate(finding, policy, now);
            tracing::debug!(
                finding_id = %finding.finding_id,
                component = %finding.component,
                status = classification.label(),
                "classified finding"
            );
            EvaluatedFinding {
                fingerprint: fingerprint::compute(&finding.finding_id, &finding.component),
                classification,
                finding: finding.clone(),
            }
        })
        .collect()
}
