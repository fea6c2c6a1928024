//! Policy document loading and validation.
//!
//! Deserializes the external YAML document into raw records mirroring its
//! on-disk shape, then validates field by field into the typed
//! `PolicyDocument`, so every rejection names the finding id and field a
//! human needs to fix. In lenient mode an invalid rule is skipped with a
//! warning instead of rejecting the document; it never suppresses either way.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use crate::config::ValidationMode;
use crate::errors::PolicyError;
use crate::models::policy::{
    AppliedPatch, IgnoreRule, PatchEntry, PolicyDocument, SUPPORTED_SCHEMA_VERSION,
};

// -- Raw document shape --

#[derive(Debug, Deserialize)]
struct RawPolicy {
    version: String,
    #[serde(default)]
    ignore: BTreeMap<String, Vec<BTreeMap<String, RawRuleBody>>>,
    #[serde(default)]
    patch: BTreeMap<String, Vec<BTreeMap<String, RawPatchBody>>>,
}

#[derive(Debug, Deserialize)]
struct RawRuleBody {
    reason: Option<String>,
    created: Option<String>,
    expires: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPatchBody {
    patched: Option<String>,
}

// -- Loading --

/// Load and validate a policy document from disk.
pub fn load_policy(path: &Path, mode: ValidationMode) -> Result<PolicyDocument, PolicyError> {
    let raw = fs::read_to_string(path)?;
    let mut doc = parse_policy(&raw, mode)?;
    doc.source = Some(path.to_path_buf());
    Ok(doc)
}

/// Parse and validate a policy document from YAML text.
pub fn parse_policy(raw: &str, mode: ValidationMode) -> Result<PolicyDocument, PolicyError> {
    let raw_doc: RawPolicy = serde_yaml::from_str(raw)?;

    if raw_doc.version != SUPPORTED_SCHEMA_VERSION {
        return Err(PolicyError::UnsupportedVersion {
            found: raw_doc.version,
            expected: SUPPORTED_SCHEMA_VERSION,
        });
    }

    let mut ignore_rules: BTreeMap<String, Vec<IgnoreRule>> = BTreeMap::new();
    for (finding_id, items) in raw_doc.ignore {
        let mut rules = Vec::new();
        for item in items {
            for (pattern, body) in item {
                match validate_rule(&finding_id, &pattern, body) {
                    Ok(rule) => rules.push(rule),
                    Err(err) if mode == ValidationMode::Lenient => {
                        tracing::warn!(
                            finding_id = %finding_id,
                            pattern = %pattern,
                            error = %err,
                            "skipping invalid ignore rule"
                        );
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        if !rules.is_empty() {
            ignore_rules.insert(finding_id, rules);
        }
    }

    let mut patch_entries: BTreeMap<String, PatchEntry> = BTreeMap::new();
    for (finding_id, items) in raw_doc.patch {
        let mut applied = Vec::new();
        for item in items {
            for (pattern, body) in item {
                match validate_patch(&finding_id, &pattern, body) {
                    Ok(patch) => applied.push(patch),
                    Err(err) if mode == ValidationMode::Lenient => {
                        tracing::warn!(
                            finding_id = %finding_id,
                            pattern = %pattern,
                            error = %err,
                            "skipping invalid patch entry"
                        );
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        patch_entries.insert(
            finding_id.clone(),
            PatchEntry {
                finding_id,
                applied,
            },
        );
    }

    Ok(PolicyDocument {
        schema_version: SUPPORTED_SCHEMA_VERSION.to_string(),
        ignore_rules,
        patch_entries,
        source: None,
    })
}

// -- Validation --

fn validate_rule(
    finding_id: &str,
    pattern: &str,
    body: RawRuleBody,
) -> Result<IgnoreRule, PolicyError> {
    let reason = match body.reason {
        Some(r) if !r.trim().is_empty() => r,
        Some(_) => {
            return Err(malformed(finding_id, "reason", "must not be empty"));
        }
        None => {
            return Err(malformed(finding_id, "reason", "missing required field"));
        }
    };

    let created_raw = body
        .created
        .ok_or_else(|| malformed(finding_id, "created", "missing required field"))?;
    let created_at = parse_timestamp(&created_raw, finding_id, "created")?;

    let expires_at = body
        .expires
        .map(|raw| parse_timestamp(&raw, finding_id, "expires"))
        .transpose()?;

    if let Some(expires) = expires_at {
        if expires <= created_at {
            return Err(PolicyError::InvalidTimeRange {
                finding_id: finding_id.to_string(),
                pattern: pattern.to_string(),
                created: created_at,
                expires,
            });
        }
    }

    Ok(IgnoreRule {
        finding_id: finding_id.to_string(),
        match_pattern: pattern.to_string(),
        reason,
        created_at,
        expires_at,
    })
}

fn validate_patch(
    finding_id: &str,
    pattern: &str,
    body: RawPatchBody,
) -> Result<AppliedPatch, PolicyError> {
    let patched_at = body
        .patched
        .map(|raw| parse_timestamp(&raw, finding_id, "patched"))
        .transpose()?;

    Ok(AppliedPatch {
        match_pattern: pattern.to_string(),
        patched_at,
    })
}

/// Parse an ISO-8601 timestamp, accepting a bare date as midnight UTC.
fn parse_timestamp(
    raw: &str,
    finding_id: &str,
    field: &str,
) -> Result<DateTime<Utc>, PolicyError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(malformed(
        finding_id,
        field,
        &format!("'{raw}' is not an ISO-8601 timestamp"),
    ))
}

fn malformed(finding_id: &str, field: &str, message: &str) -> PolicyError {
    PolicyError::MalformedPolicy {
        finding_id: finding_id.to_string(),
        field: field.to_string(),
        message: message.to_string(),
    }
}
