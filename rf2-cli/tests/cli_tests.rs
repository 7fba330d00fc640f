#![allow(clippy::unwrap_used)]
//! Integration tests for a full `rf2-validate` run.
//!
//! These tests cover:
//! - Report files written to a created output directory
//! - Lookup report only when an effective time is expected
//! - JSON report on request
//! - Console echo of lookup errors, capped per file
//! - Missing input root
//! - Output destination checked before validation

use std::fs;
use std::path::Path;

use clap::Parser;
use rf2_cli::cli::Cli;
use rf2_cli::run::MAX_ECHOED_LOOKUP_ERRORS;
use rf2_cli::{echo_lookup_errors, run};
use tempfile::TempDir;

const CONCEPT_NAME: &str = "sct2_Concept_Snapshot_INT_20130731.txt";
const CONCEPT_HEADER: &str = "id\teffectiveTime\tactive\tmoduleId\tdefinitionStatusId";
const CONCEPT_ROW: &str = "138875005\t20130731\t1\t900000000000207008\t900000000000074008";

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn release(rows: usize) -> TempDir {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("Snapshot").join("Terminology");
    fs::create_dir_all(&dir).unwrap();
    let mut content = format!("{CONCEPT_HEADER}\r\n");
    for _ in 0..rows {
        content.push_str(CONCEPT_ROW);
        content.push_str("\r\n");
    }
    fs::write(dir.join(CONCEPT_NAME), content).unwrap();
    tmp
}

fn cli(input: &Path, output: &Path, extra: &[&str]) -> Cli {
    let mut args = vec![
        "rf2-validate".to_owned(),
        "--input".to_owned(),
        input.display().to_string(),
        "--output".to_owned(),
        output.display().to_string(),
    ];
    args.extend(extra.iter().map(|a| (*a).to_owned()));
    Cli::try_parse_from(args).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Reports
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_run_writes_formatting_report() {
    let input = release(1);
    let out = TempDir::new().unwrap();
    let output = out.path().join("reports").join("nested");

    let report = run(&cli(input.path(), &output, &[])).unwrap();
    assert!(report.ok);

    let text = fs::read_to_string(output.join("formattingReport.txt")).unwrap();
    assert!(text.starts_with("Processing File Snapshot"), "got: {text}");
    assert!(text.ends_with("Processed 1 files, 1 were valid, 0 had errors\n"), "got: {text}");
    assert!(!output.join("lookupReport.txt").exists());
    assert!(!output.join("formattingReport.json").exists());
}

#[test]
fn test_run_reports_invalid_files() {
    let input = release(1);
    fs::write(input.path().join("stray.txt"), "x\n").unwrap();
    let out = TempDir::new().unwrap();

    let report = run(&cli(input.path(), out.path(), &[])).unwrap();
    assert!(!report.ok);

    let text = fs::read_to_string(out.path().join("formattingReport.txt")).unwrap();
    assert!(text.contains("Processing File stray.txt\nERROR: "), "got: {text}");
    assert!(text.ends_with("Processed 2 files, 1 were valid, 1 had errors\n"), "got: {text}");
}

#[test]
fn test_run_writes_lookup_and_json_reports() {
    let input = release(2);
    let out = TempDir::new().unwrap();

    let report = run(&cli(
        input.path(),
        out.path(),
        &["--expected-effective-time", "20140131", "--json"],
    ))
    .unwrap();
    assert!(report.ok);
    assert_eq!(report.lookup_errors_count(), 2);

    let lookup = fs::read_to_string(out.path().join("lookupReport.txt")).unwrap();
    assert!(
        lookup.contains(
            "ERROR: Line 3 failed the lookup: Wrong time - expected 20140131 but file has 20130731"
        ),
        "got: {lookup}"
    );

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.path().join("formattingReport.json")).unwrap())
            .unwrap();
    assert_eq!(json["processed_files"], 1);
    assert_eq!(json["ok"], true);
}

#[test]
fn test_run_missing_input_errors() {
    let out = TempDir::new().unwrap();
    let err = run(&cli(&out.path().join("missing"), out.path(), &[])).unwrap_err();
    assert!(err.to_string().contains("does not exist"), "got: {err}");
}

#[test]
fn test_run_unwritable_output_fails_before_validation() {
    let out = TempDir::new().unwrap();
    let blocker = out.path().join("reports");
    fs::write(&blocker, "not a directory").unwrap();

    // the input is missing too, so reaching validation would report that instead
    let err = run(&cli(&out.path().join("missing"), &blocker, &[])).unwrap_err();
    assert!(
        err.to_string().contains("Failed to create output directory"),
        "got: {err:#}"
    );
}

#[test]
fn test_run_unwritable_formatting_report_fails_before_validation() {
    let out = TempDir::new().unwrap();
    fs::create_dir(out.path().join("formattingReport.txt")).unwrap();

    let err = run(&cli(&out.path().join("missing"), out.path(), &[])).unwrap_err();
    assert!(err.to_string().contains("Failed to create"), "got: {err:#}");
    assert!(err.to_string().contains("formattingReport.txt"), "got: {err:#}");
}

// ─────────────────────────────────────────────────────────────────────────────
// Console echo
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_echo_caps_lookup_errors_per_file() {
    let input = release(MAX_ECHOED_LOOKUP_ERRORS + 3);
    let out = TempDir::new().unwrap();
    let report = run(&cli(
        input.path(),
        out.path(),
        &["--expected-effective-time", "20140131"],
    ))
    .unwrap();

    let mut echoed = Vec::new();
    echo_lookup_errors(&report, &mut echoed).unwrap();
    let echoed = String::from_utf8(echoed).unwrap();

    assert_eq!(
        echoed.lines().filter(|l| l.starts_with("ERROR: ")).count(),
        MAX_ECHOED_LOOKUP_ERRORS
    );
    assert!(
        echoed.contains("Suppressing 3 further lookup errors for this file"),
        "got: {echoed}"
    );

    // the report file is never capped
    let lookup = fs::read_to_string(out.path().join("lookupReport.txt")).unwrap();
    assert_eq!(
        lookup.lines().filter(|l| l.starts_with("ERROR: ")).count(),
        MAX_ECHOED_LOOKUP_ERRORS + 3
    );
}

#[test]
fn test_echo_is_silent_without_lookup_errors() {
    let input = release(1);
    let out = TempDir::new().unwrap();
    let report = run(&cli(input.path(), out.path(), &[])).unwrap();

    let mut echoed = Vec::new();
    echo_lookup_errors(&report, &mut echoed).unwrap();
    assert!(echoed.is_empty());
}
