//! End-to-end test for the full evaluation pipeline.
//!
//! Exercises policy loading, findings parsing, classification, report
//! assembly, and the gate decision against the fixture files, plus the
//! `evaluate` command wiring itself.
//!
//! Run with: `cargo test --test evaluation_pipeline_test`

use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use vulngate::commands::evaluate::{self, EvaluateArgs};
use vulngate::config::ValidationMode;
use vulngate::models::finding::{Classification, SeverityLevel};
use vulngate::parsers::findings::FindingsParser;
use vulngate::parsers::{InputFormat, Parser};
use vulngate::services::{evaluator, gate, loader, report};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn at(ts: &str) -> DateTime<Utc> {
    ts.parse().unwrap()
}

#[test]
fn full_pipeline_classifies_and_gates() {
    let policy = loader::load_policy(&fixture("policy_sample.yaml"), ValidationMode::Strict)
        .expect("policy should load");
    assert_eq!(policy.rule_count(), 3);

    let data = std::fs::read(fixture("findings_sample.json")).expect("findings fixture");
    let parsed = FindingsParser::new()
        .parse(&data, InputFormat::Json)
        .expect("findings should parse");
    assert_eq!(parsed.findings.len(), 4);
    assert!(parsed.errors.is_empty());

    // Reference time between the django rule's expiry (2024-09) and the
    // lodash rule's (2026-01).
    let now = at("2025-01-01T00:00:00Z");
    let results = evaluator::evaluate_all(&parsed.findings, &policy, now);

    let statuses: Vec<&str> = results
        .iter()
        .map(|r| r.classification.label())
        .collect();
    assert_eq!(
        statuses,
        vec!["suppressed", "expired", "suppressed", "unmatched"]
    );

    // The expired entry carries when coverage lapsed.
    match &results[1].classification {
        Classification::Expired { expired_at, .. } => {
            assert_eq!(*expired_at, at("2024-09-01T00:00:00Z"));
        }
        other => panic!("expected Expired, got {other:?}"),
    }

    let report = report::build(
        results,
        Some("policy_sample.yaml".to_string()),
        Some("findings_sample.json".to_string()),
        Utc::now(),
    );
    assert_eq!(report.totals.suppressed, 2);
    assert_eq!(report.totals.expired, 1);
    assert_eq!(report.totals.unmatched, 1);
    assert_eq!(report.totals.patched, 0);

    // Medium threshold: the expired medium finding and the unmatched
    // critical finding both gate.
    let decision = gate::decide(&report, SeverityLevel::Medium);
    assert!(!decision.passed);
    assert_eq!(decision.failing.len(), 2);
    assert_eq!(decision.exit_code(), 1);

    // Critical threshold: only the unmatched critical finding remains.
    let decision = gate::decide(&report, SeverityLevel::Critical);
    assert_eq!(decision.failing.len(), 1);
    assert_eq!(
        decision.failing[0].finding.finding_id,
        "SNYK-JS-AXIOS-6032459"
    );
}

#[test]
fn report_round_trips_through_json() {
    let policy = loader::load_policy(&fixture("policy_sample.yaml"), ValidationMode::Strict)
        .expect("policy should load");
    let data = std::fs::read(fixture("findings_sample.json")).expect("findings fixture");
    let parsed = FindingsParser::new()
        .parse(&data, InputFormat::Json)
        .expect("findings should parse");

    let results = evaluator::evaluate_all(&parsed.findings, &policy, at("2025-01-01T00:00:00Z"));
    let report = report::build(results, None, None, Utc::now());

    let json = serde_json::to_string(&report).expect("serialize");
    let back: vulngate::models::report::EvaluationReport =
        serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.run_id, report.run_id);
    assert_eq!(back.totals, report.totals);
    assert_eq!(back.results, report.results);
}

#[test]
fn lenient_load_from_disk_skips_bad_rule() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"version: v1.5
ignore:
  VULN-BAD:
    - '*':
        created: 2024-01-01T00:00:00Z
  VULN-GOOD:
    - '*':
        reason: accepted risk
        created: 2024-01-01T00:00:00Z
"#
    )
    .expect("write policy");

    // Strict rejects the document outright.
    let err = loader::load_policy(file.path(), ValidationMode::Strict).unwrap_err();
    assert!(err.is_malformed());

    // Lenient keeps the valid rule and records where it loaded from.
    let policy = loader::load_policy(file.path(), ValidationMode::Lenient).expect("lenient load");
    assert!(policy.rules_for("VULN-BAD").is_empty());
    assert_eq!(policy.rules_for("VULN-GOOD").len(), 1);
    assert_eq!(policy.source.as_deref(), Some(file.path()));
}

#[test]
fn evaluate_command_fails_gate_on_fixture_findings() {
    let args = EvaluateArgs {
        policy: fixture("policy_sample.yaml"),
        findings: fixture("findings_sample.json"),
        format: InputFormat::Json,
        now: Some("2025-01-01T00:00:00Z".to_string()),
        fail_on: Some("medium".to_string()),
        lenient: false,
        json: true,
    };
    let code = evaluate::run(&args).expect("command should run");
    assert_eq!(code, 1);
}

#[test]
fn evaluate_command_passes_before_any_expiry() {
    // The CSV fixture has no unmatched finding, and at this reference time
    // every ignore rule is still live.
    let args = EvaluateArgs {
        policy: fixture("policy_sample.yaml"),
        findings: fixture("findings_sample.csv"),
        format: InputFormat::Csv,
        now: Some("2024-05-01T00:00:00Z".to_string()),
        fail_on: Some("medium".to_string()),
        lenient: false,
        json: false,
    };
    let code = evaluate::run(&args).expect("command should run");
    assert_eq!(code, 0);
}

#[test]
fn evaluate_command_surfaces_policy_load_failure() {
    let args = EvaluateArgs {
        policy: fixture("does_not_exist.yaml"),
        findings: fixture("findings_sample.json"),
        format: InputFormat::Json,
        now: None,
        fail_on: None,
        lenient: false,
        json: false,
    };
    assert!(evaluate::run(&args).is_err());
}
