use serde_json::json;
use tracing::info;

use crate::cli::config::ReportFormat;
use crate::config::settings::{ConfigIssue, FillConfig, load_config};
use crate::dom::document::{Document, PageSnapshot};
use crate::dom::host::FormHost;
use crate::engine::session::{FillOptions, classify_form, fill_form_with};
use crate::error::AppError;
use crate::report::console::{format_classification_table, format_console_report};
use crate::trace::logger::TraceLogger;

// ============================================================================
// fill subcommand
// ============================================================================

/// Fill a snapshot and return the rendered report.
pub fn cmd_fill(
    snapshot_path: &str,
    config_path: Option<&str>,
    output: Option<&str>,
    format: ReportFormat,
    seed: Option<u64>,
    trace: Option<&str>,
) -> Result<String, AppError> {
    let config = load_config(config_path)?;
    let mut document = load_document(snapshot_path)?;
    let tracer = trace.map(TraceLogger::new);

    let root = document.root();
    let report = fill_form_with(
        &mut document,
        root,
        &config,
        FillOptions {
            seed,
            tracer: tracer.as_ref(),
            ..FillOptions::default()
        },
    );

    if let Some(path) = output {
        let filled = serde_json::to_string_pretty(&document.to_snapshot()).map_err(|source| {
            AppError::JsonSerialize {
                context: "filled snapshot".into(),
                source,
            }
        })?;
        write_file(path, &filled)?;
        info!(path, "filled snapshot written");
    }

    match format {
        ReportFormat::Console => Ok(format_console_report(&report)),
        ReportFormat::Json => serde_json::to_string_pretty(&report).map_err(|source| AppError::JsonSerialize {
            context: "fill report".into(),
            source,
        }),
    }
}

// ============================================================================
// classify subcommand
// ============================================================================

pub fn cmd_classify(snapshot_path: &str, config_path: Option<&str>) -> Result<String, AppError> {
    let config = load_config(config_path)?;
    let document = load_document(snapshot_path)?;
    let (fields, warnings) = classify_form(&document, document.root(), &config);

    let mut out = format_issues(&warnings);
    out.push_str(&format_classification_table(&fields));
    Ok(out)
}

// ============================================================================
// check-config subcommand
// ============================================================================

/// Validation result: rendered issues and whether any of them is an error.
pub fn cmd_check_config(config_path: &str) -> Result<(String, bool), AppError> {
    let config = load_config(Some(config_path))?;
    let issues = config.validate();
    let has_errors = issues.iter().any(ConfigIssue::is_error);

    let mut out = format_issues(&issues);
    if issues.is_empty() {
        out.push_str(&format!("{}: ok\n", config_path));
    }
    out.push_str(&config_summary(&config));
    Ok((out, has_errors))
}

fn config_summary(config: &FillConfig) -> String {
    let summary = json!({
        "locale": config.locale,
        "customFields": config.custom_fields.len(),
        "ignoreDomains": config.ignore_domains.len(),
        "threshold": config.threshold(),
    });
    format!("{}\n", summary)
}

fn format_issues(issues: &[ConfigIssue]) -> String {
    issues.iter().map(|i| format!("{}\n", i)).collect()
}

// ============================================================================
// Snapshot I/O
// ============================================================================

pub fn load_document(path: &str) -> Result<Document, AppError> {
    let content = std::fs::read_to_string(path).map_err(|source| AppError::SnapshotRead {
        path: path.to_string(),
        source,
    })?;
    let snapshot: PageSnapshot = serde_json::from_str(&content).map_err(|source| AppError::SnapshotParse {
        path: path.to_string(),
        source,
    })?;
    Ok(Document::from_snapshot(&snapshot))
}

fn write_file(path: &str, content: &str) -> Result<(), AppError> {
    std::fs::write(path, content).map_err(|source| AppError::Write {
        path: path.to_string(),
        source,
    })
}
