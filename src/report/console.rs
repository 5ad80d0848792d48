use crate::engine::session::ClassifiedField;
use crate::report::report_model::{FieldOutcome, FillReport};

// ============================================================================
// Console reporter: formatted terminal output
// ============================================================================

/// Format a fill report for terminal output.
///
/// Produces output like:
/// ```text
/// === Fill Report: shop.example.com ===
///
/// ✓ FILLED   input[name="email"]  email (rule-based) = "anna.weber@example.com"
/// ✗ SKIPPED  input[name="token"]  hidden input
///
/// === Results: 1 filled, 1 skipped (2 total) in 0.0s ===
/// ```
pub fn format_console_report(report: &FillReport) -> String {
    let mut out = String::new();
    let host = report.hostname.as_deref().unwrap_or("(no hostname)");

    out.push_str(&format!("=== Fill Report: {} ===\n\n", host));

    if report.domain_ignored {
        out.push_str("Domain is on the ignore list, nothing filled.\n");
        return out;
    }

    for issue in &report.warnings {
        out.push_str(&format!("  {}\n", issue));
    }
    if !report.warnings.is_empty() {
        out.push('\n');
    }

    for field in &report.fields {
        out.push_str(&format_outcome(field));
        out.push('\n');
    }

    if report.skipped_frames > 0 {
        out.push_str(&format!("\n({} iframe(s) not entered)\n", report.skipped_frames));
    }

    out.push_str(&format!(
        "\n=== Results: {} filled, {} skipped ({} total)",
        report.filled, report.skipped, report.total
    ));

    if let Some(ms) = report.duration_ms {
        let secs = ms as f64 / 1000.0;
        out.push_str(&format!(" in {:.1}s", secs));
    }

    out.push_str(" ===\n");

    out
}

fn format_outcome(field: &FieldOutcome) -> String {
    let classified = match (field.semantic, field.source) {
        (Some(semantic), Some(source)) => match field.confidence {
            Some(score) => format!("  {} ({}, {}%)", semantic, source.as_str(), score),
            None => format!("  {} ({})", semantic, source.as_str()),
        },
        _ => String::new(),
    };

    if field.is_filled() {
        let value = field.value.as_deref().unwrap_or("");
        let mut line = format!("\u{2713} FILLED   {}{} = {:?}", field.path, classified, value);
        if let Some(note) = &field.note {
            line.push_str(&format!("\n    [NOTE] {}", note));
        }
        line
    } else {
        let reason = field
            .reason
            .as_ref()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "skipped".to_string());
        let mut line = format!("\u{2717} SKIPPED  {}{}  {}", field.path, classified, reason);
        if field.reason.as_ref().is_some_and(|r| r.is_error()) {
            line.push_str("\n    [ERROR] field left untouched");
        }
        line
    }
}

/// One line per field: path, kind, semantic type and where it came from.
pub fn format_classification_table(fields: &[ClassifiedField]) -> String {
    let width = fields.iter().map(|f| f.path.len()).max().unwrap_or(0);
    let mut out = String::new();
    for field in fields {
        out.push_str(&format!(
            "{:<width$}  {:<10}  {:<14}  {}",
            field.path,
            field.kind.as_str(),
            field.classification.semantic,
            field.classification.source.as_str(),
            width = width
        ));
        if let Some(score) = field.classification.confidence {
            out.push_str(&format!(" ({}%)", score));
        }
        if let Some(rule) = field.classification.rule_index {
            out.push_str(&format!(" [rule {}]", rule));
        }
        out.push('\n');
    }
    out
}
