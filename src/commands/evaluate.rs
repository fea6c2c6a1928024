//! `vulngate evaluate` command implementation.
//!
//! Wires the full pipeline: load policy, parse findings, classify, report,
//! gate. Exit code 1 when the gate fails, 0 otherwise.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use crate::config::{EvalConfig, ValidationMode};
use crate::models::finding::{Classification, SeverityLevel};
use crate::models::report::EvaluationReport;
use crate::parsers::findings::FindingsParser;
use crate::parsers::{InputFormat, Parser};
use crate::services::gate::{self, GateDecision};
use crate::services::{evaluator, loader, report};

/// Arguments for `vulngate evaluate`.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Suppression policy document (YAML).
    #[arg(long)]
    pub policy: PathBuf,

    /// Findings file. Use "-" for stdin.
    #[arg(long)]
    pub findings: PathBuf,

    /// Findings input format.
    #[arg(long, default_value = "json")]
    pub format: InputFormat,

    /// Evaluation reference time (RFC 3339). Defaults to the current time.
    #[arg(long)]
    pub now: Option<String>,

    /// Minimum severity at which expired/unmatched findings fail the gate.
    #[arg(long)]
    pub fail_on: Option<String>,

    /// Skip invalid ignore rules with a warning instead of rejecting
    /// the document.
    #[arg(long)]
    pub lenient: bool,

    /// Emit the report as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

/// JSON envelope for `--json` output.
#[derive(Serialize)]
struct JsonOutput<'a> {
    report: &'a EvaluationReport,
    gate: &'a GateDecision,
}

/// Run the evaluate command, returning the process exit code.
pub fn run(args: &EvaluateArgs) -> Result<i32> {
    let started_at = Utc::now();
    let config = resolve_config(args)?;

    let policy = loader::load_policy(&args.policy, config.validation)
        .with_context(|| format!("failed to load policy {}", args.policy.display()))?;
    tracing::info!(
        policy = %args.policy.display(),
        rules = policy.rule_count(),
        finding_ids = policy.finding_id_count(),
        "loaded suppression policy"
    );

    let data = read_input(&args.findings)?;
    let parser = FindingsParser::new();
    let parse_result = parser
        .parse(&data, args.format.clone())
        .with_context(|| format!("failed to parse findings {}", args.findings.display()))?;
    for err in &parse_result.errors {
        tracing::warn!(
            record = err.record_index,
            field = %err.field,
            "skipped findings record: {}",
            err.message
        );
    }

    let now = resolve_now(args.now.as_deref())?;
    let results = evaluator::evaluate_all(&parse_result.findings, &policy, now);
    let report = report::build(
        results,
        Some(args.policy.display().to_string()),
        Some(args.findings.display().to_string()),
        started_at,
    );
    let decision = gate::decide(&report, config.fail_level);

    if args.json {
        let output = JsonOutput {
            report: &report,
            gate: &decision,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_text(&report, &decision));
    }

    Ok(decision.exit_code())
}

/// Merge CLI flags over environment config.
fn resolve_config(args: &EvaluateArgs) -> Result<EvalConfig> {
    let mut config = EvalConfig::from_env();
    if let Some(level) = &args.fail_on {
        config.fail_level = SeverityLevel::parse_loose(level)
            .with_context(|| format!("unrecognized severity '{level}' for --fail-on"))?;
    }
    if args.lenient {
        config.validation = ValidationMode::Lenient;
    }
    Ok(config)
}

fn resolve_now(raw: Option<&str>) -> Result<DateTime<Utc>> {
    match raw {
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("--now value '{value}' is not an RFC 3339 timestamp")),
        None => Ok(Utc::now()),
    }
}

fn read_input(path: &PathBuf) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }

    fs::read(path).with_context(|| format!("failed to read findings {}", path.display()))
}

/// Human-readable report for non-JSON output.
fn render_text(report: &EvaluationReport, decision: &GateDecision) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "Policy evaluation (run {})", report.run_id);
    if let Some(policy) = &report.policy_file {
        let _ = writeln!(out, "  policy:   {policy}");
    }
    if let Some(findings) = &report.findings_file {
        let _ = writeln!(out, "  findings: {findings}");
    }
    let _ = writeln!(out);

    for result in &report.results {
        let detail = match &result.classification {
            Classification::Suppressed {
                reason,
                expires: Some(expires),
                ..
            } => format!("{reason} (until {expires})"),
            Classification::Suppressed { reason, .. } => format!("{reason} (never expires)"),
            Classification::Expired { expired_at, .. } => format!("lapsed {expired_at}"),
            Classification::Patched => "resolved by applied patch".to_string(),
            Classification::Unmatched => String::new(),
        };
        let _ = writeln!(
            out,
            "  {:<10}  {}  {}  {}  {}",
            result.classification.label().to_uppercase(),
            result.finding.finding_id,
            result.finding.component,
            result.finding.severity,
            detail
        );
    }

    let _ = writeln!(
        out,
        "\nTotals: {} suppressed, {} expired, {} patched, {} unmatched",
        report.totals.suppressed,
        report.totals.expired,
        report.totals.patched,
        report.totals.unmatched
    );
    if decision.passed {
        let _ = writeln!(out, "Gate: PASSED (threshold {})", decision.threshold);
    } else {
        let _ = writeln!(
            out,
            "Gate: FAILED (threshold {}): {} finding(s) require attention",
            decision.threshold,
            decision.failing.len()
        );
    }
    out
}
