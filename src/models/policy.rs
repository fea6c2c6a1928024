//! Validated suppression-policy model.
//!
//! A `PolicyDocument` is built once by the loader from the external YAML
//! document and is immutable for the duration of an evaluation run. Updating
//! policy means authoring and loading a whole new document.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single policy schema version this build understands.
pub const SUPPORTED_SCHEMA_VERSION: &str = "v1.5";

// -- Ignore rules --

/// One accepted-risk entry: suppress a finding for a matching component,
/// with a recorded justification and an optional expiry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IgnoreRule {
    pub finding_id: String,
    /// `*`, an exact component coordinate, or a `>`-separated dependency
    /// path whose segments may themselves be `*`.
    pub match_pattern: String,
    /// Human justification. Never empty; the loader rejects rules without one.
    pub reason: String,
    pub created_at: DateTime<Utc>,
    /// `None` means the suppression never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl IgnoreRule {
    /// Whether this rule's pattern selects the given component descriptor.
    pub fn matches_component(&self, component: &str) -> bool {
        pattern_matches(&self.match_pattern, component)
    }

    /// Whether the suppression still holds at the reference time.
    /// An expiry exactly equal to `now` counts as lapsed.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            None => true,
            Some(expires) => expires > now,
        }
    }
}

/// Match a rule pattern against a component descriptor.
///
/// Supports:
/// - Wildcard all: `*` matches any component
/// - Exact match: `lodash` matches `lodash`
/// - Path match: `django > sqlparse` matches the same `>`-separated path,
///   with `*` allowed per segment (`* > sqlparse` matches `django > sqlparse`)
pub fn pattern_matches(pattern: &str, component: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if pattern == component {
        return true;
    }

    let pattern_segments: Vec<&str> = pattern.split('>').map(str::trim).collect();
    let component_segments: Vec<&str> = component.split('>').map(str::trim).collect();

    pattern_segments.len() == component_segments.len()
        && pattern_segments
            .iter()
            .zip(&component_segments)
            .all(|(p, c)| *p == "*" || p == c)
}

// -- Patch entries --

/// A patch applied to one component path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedPatch {
    pub match_pattern: String,
    pub patched_at: Option<DateTime<Utc>>,
}

/// Record that a finding is addressed by applied source patches rather
/// than a suppression.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatchEntry {
    pub finding_id: String,
    pub applied: Vec<AppliedPatch>,
}

// -- Document --

/// The whole validated policy: loaded once, read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyDocument {
    pub schema_version: String,
    /// Keyed by finding id; the sequence holds distinct match-pattern
    /// variants for that finding, in document order.
    pub ignore_rules: BTreeMap<String, Vec<IgnoreRule>>,
    pub patch_entries: BTreeMap<String, PatchEntry>,
    /// Where the document was loaded from, when loaded from disk.
    pub source: Option<PathBuf>,
}

impl PolicyDocument {
    /// All ignore rules registered for a finding id, in document order.
    pub fn rules_for(&self, finding_id: &str) -> &[IgnoreRule] {
        self.ignore_rules
            .get(finding_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_patched(&self, finding_id: &str) -> bool {
        self.patch_entries.contains_key(finding_id)
    }

    pub fn rule_count(&self) -> usize {
        self.ignore_rules.values().map(Vec::len).sum()
    }

    pub fn finding_id_count(&self) -> usize {
        self.ignore_rules.len()
    }
}
