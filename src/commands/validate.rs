//! `vulngate validate` command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::config::{EvalConfig, ValidationMode};
use crate::services::loader;

/// Arguments for `vulngate validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Suppression policy document (YAML).
    #[arg(long)]
    pub policy: PathBuf,

    /// Skip invalid ignore rules with a warning instead of rejecting
    /// the document.
    #[arg(long)]
    pub lenient: bool,
}

/// Run the validate command, returning the process exit code.
pub fn run(args: &ValidateArgs) -> Result<i32> {
    let mut mode = EvalConfig::from_env().validation;
    if args.lenient {
        mode = ValidationMode::Lenient;
    }

    let policy = loader::load_policy(&args.policy, mode)
        .with_context(|| format!("failed to load policy {}", args.policy.display()))?;

    println!(
        "Policy OK: {}: {} ignore rule(s) across {} finding id(s), {} patch entr{}",
        policy.schema_version,
        policy.rule_count(),
        policy.finding_id_count(),
        policy.patch_entries.len(),
        if policy.patch_entries.len() == 1 {
            "y"
        } else {
            "ies"
        }
    );

    Ok(0)
}
