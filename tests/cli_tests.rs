mod common;

use std::path::Path;

use clap::Parser;
use common::*;
use form_autofill::cli::commands::{cmd_check_config, cmd_classify, cmd_fill, load_document};
use form_autofill::cli::config::{Cli, Commands, ReportFormat, verbosity_filter};
use form_autofill::dom::document::PageSnapshot;
use form_autofill::dom::host::FormHost;
use form_autofill::error::AppError;
use tempfile::TempDir;

fn write_snapshot(dir: &TempDir) -> String {
    let snapshot = PageSnapshot {
        url: Some("https://shop.example.com/checkout".into()),
        root: form(vec![
            input("email", "email"),
            text_input("city"),
            input("hidden", "csrf").attr("value", "t0k3n"),
        ]),
    };
    let path = dir.path().join("page.json");
    std::fs::write(&path, serde_json::to_string_pretty(&snapshot).unwrap()).unwrap();
    path.to_str().unwrap().to_string()
}

fn write_config(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("settings.yaml");
    std::fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

fn path_str(p: &Path) -> &str {
    p.to_str().unwrap()
}

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn cli_parse_fill_minimal() {
    let cli = Cli::parse_from(["form-autofill", "fill", "--snapshot", "page.json"]);
    match cli.command {
        Commands::Fill {
            snapshot,
            config,
            output,
            format,
            seed,
            trace,
        } => {
            assert_eq!(snapshot, "page.json");
            assert!(config.is_none());
            assert!(output.is_none());
            assert_eq!(format, ReportFormat::Console);
            assert!(seed.is_none());
            assert!(trace.is_none());
        }
        _ => panic!("Expected Fill command"),
    }
    assert_eq!(cli.verbose, 0);
}

#[test]
fn cli_parse_fill_all_args() {
    let cli = Cli::parse_from([
        "form-autofill",
        "fill",
        "--snapshot",
        "page.json",
        "--config",
        "s.yaml",
        "-o",
        "out.json",
        "--format",
        "json",
        "--seed",
        "42",
        "--trace",
        "trace.jsonl",
        "-vv",
    ]);
    match cli.command {
        Commands::Fill {
            config,
            output,
            format,
            seed,
            trace,
            ..
        } => {
            assert_eq!(config.as_deref(), Some("s.yaml"));
            assert_eq!(output.as_deref(), Some("out.json"));
            assert_eq!(format, ReportFormat::Json);
            assert_eq!(seed, Some(42));
            assert_eq!(trace.as_deref(), Some("trace.jsonl"));
        }
        _ => panic!("Expected Fill command"),
    }
    assert_eq!(cli.verbose, 2);
}

#[test]
fn cli_parse_classify_and_check_config() {
    let cli = Cli::parse_from(["form-autofill", "classify", "--snapshot", "p.json"]);
    assert!(matches!(cli.command, Commands::Classify { ref snapshot, config: None } if snapshot == "p.json"));

    let cli = Cli::parse_from(["form-autofill", "check-config", "--config", "s.yaml"]);
    assert!(matches!(cli.command, Commands::CheckConfig { ref config } if config == "s.yaml"));
}

#[test]
fn cli_rejects_unknown_format() {
    let result = Cli::try_parse_from(["form-autofill", "fill", "--snapshot", "p.json", "--format", "xml"]);
    assert!(result.is_err());
}

#[test]
fn verbosity_maps_to_filters() {
    assert_eq!(verbosity_filter(0), "warn");
    assert_eq!(verbosity_filter(1), "info");
    assert_eq!(verbosity_filter(2), "debug");
    assert_eq!(verbosity_filter(9), "trace");
}

// ============================================================================
// Command Tests
// ============================================================================

#[test]
fn fill_renders_console_report() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = write_snapshot(&dir);
    let missing_config = dir.path().join("none.yaml");

    let out = cmd_fill(&snapshot, Some(path_str(&missing_config)), None, ReportFormat::Console, Some(1), None).unwrap();
    assert!(out.starts_with("=== Fill Report: shop.example.com ==="));
    assert!(out.contains("FILLED   input[name=\"email\"]  email (rule-based)"));
    assert!(out.contains("SKIPPED  input[name=\"csrf\"]  hidden input"));
    assert!(out.contains("=== Results: 2 filled, 1 skipped (3 total)"));
}

#[test]
fn fill_writes_snapshot_and_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = write_snapshot(&dir);
    let output = dir.path().join("filled.json");
    let trace = dir.path().join("trace.jsonl");

    let out = cmd_fill(
        &snapshot,
        None,
        Some(path_str(&output)),
        ReportFormat::Json,
        Some(7),
        Some(path_str(&trace)),
    )
    .unwrap();
    let report: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(report["filled"], 2);

    let filled = load_document(path_str(&output)).unwrap();
    let email = filled.find_by_attr("name", "email").unwrap();
    assert!(filled.value(email).unwrap().contains('@'));
    assert_eq!(filled.attr(email, "data-autofill"), Some("rule-based"));
    let csrf = filled.find_by_attr("name", "csrf").unwrap();
    assert_eq!(filled.value(csrf).unwrap(), "t0k3n");

    let lines = std::fs::read_to_string(&trace).unwrap();
    assert_eq!(lines.lines().count(), 3);
}

#[test]
fn fill_reports_unreadable_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    let err = cmd_fill(path_str(&missing), None, None, ReportFormat::Console, None, None).unwrap_err();
    assert!(matches!(err, AppError::SnapshotRead { .. }));

    let garbage = dir.path().join("garbage.json");
    std::fs::write(&garbage, "{not json").unwrap();
    let err = cmd_fill(path_str(&garbage), None, None, ReportFormat::Console, None, None).unwrap_err();
    assert!(matches!(err, AppError::SnapshotParse { .. }));
}

#[test]
fn classify_prints_a_table() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = write_snapshot(&dir);
    let config = write_config(&dir, "customFields:\n  - matcher: city\n    strategy: list\n    payload: Berlin\n");

    let out = cmd_classify(&snapshot, Some(&config)).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("email") && lines[0].contains("rule-based"));
    assert!(lines[1].contains("custom-rule") && lines[1].contains("[rule 0]"));
}

#[test]
fn check_config_reports_ok_and_errors() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_config(&dir, "locale: de\n");
    let (out, has_errors) = cmd_check_config(&good).unwrap();
    assert!(!has_errors);
    assert!(out.contains(": ok"));
    assert!(out.contains("\"locale\":\"de\""));

    let bad = dir.path().join("bad.yaml");
    std::fs::write(&bad, "customFields:\n  - matcher: \"\"\n    strategy: list\n    payload: a\n").unwrap();
    let (out, has_errors) = cmd_check_config(path_str(&bad)).unwrap();
    assert!(has_errors);
    assert!(out.starts_with("[error] customFields[0]:"));
}

#[test]
fn check_config_surfaces_parse_errors() {
    let dir = tempfile::tempdir().unwrap();
    let broken = write_config(&dir, "minAge: [1\n");
    let err = cmd_check_config(&broken).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}
