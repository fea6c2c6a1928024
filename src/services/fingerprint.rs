//! Fingerprint computation for correlating findings across runs.
//!
//! A deterministic hash of the identifying fields that remain stable across
//! re-scans: the scanner-assigned id and the affected-component descriptor.
//! Volatile fields (severity, title) are excluded because scanners reclassify
//! them without the underlying issue changing.

use sha2::{Digest, Sha256};

/// Compute a finding fingerprint from its id and component descriptor.
pub fn compute(finding_id: &str, component: &str) -> String {
    hash(&format!("{finding_id}:{component}"))
}

/// SHA-256 hash a string and return hex-encoded digest.
fn hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
