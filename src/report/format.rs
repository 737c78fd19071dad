//! Formatted terminal output for the pipeline artifacts.

use crate::analysis::{LabourAnalysis, Section};
use crate::transform::TransformSummary;
use crate::validate::ValidationReport;

/// Render the validation report as a check-by-check listing.
pub fn format_validation_report(report: &ValidationReport) -> String {
    let mut out = String::new();
    out.push_str("=== Validation ===\n");
    for (name, passed) in report.checks() {
        out.push_str(&format!(
            "  [{}] {name}\n",
            if passed { "ok" } else { "FAIL" }
        ));
    }
    out.push_str(&format!(
        "Overall: {}\n",
        if report.overall_valid() { "valid" } else { "INVALID" }
    ));
    for e in &report.errors {
        out.push_str(&format!("  error: {e}\n"));
    }
    for w in &report.warnings {
        out.push_str(&format!("  warning: {w}\n"));
    }
    out
}

/// Render the transform audit counters.
pub fn format_transform_summary(summary: &TransformSummary) -> String {
    let mut out = String::new();
    out.push_str("=== Transform ===\n");
    out.push_str(&format!(
        "Rows: {} in, {} out ({} skipped)\n",
        summary.rows_in, summary.rows_out, summary.rows_skipped
    ));
    out.push_str(&format!(
        "Cleaning: {} non-numeric, {} negatives clamped, {} unparsed periods\n",
        summary.non_numeric_values, summary.negatives_clamped, summary.unparsed_periods
    ));
    out.push_str(&format!("Outliers flagged: {}\n", summary.outliers_flagged));
    out
}

/// Render the headline of a labour analysis.
pub fn format_analysis_summary(analysis: &LabourAnalysis) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "=== {} ({}) ===\n",
        analysis.metadata.region_name, analysis.metadata.region_code
    ));
    out.push_str(&format!(
        "Periods analyzed: {}",
        analysis.metadata.periods_analyzed
    ));
    if let (Some(first), Some(last)) = (
        &analysis.metadata.first_period,
        &analysis.metadata.last_period,
    ) {
        out.push_str(&format!(" ({first} .. {last})"));
    }
    out.push('\n');

    match &analysis.current_indicators {
        Section::Ok(c) => {
            out.push_str(&format!(
                "Current labour force: {:.1} (M {:.1} / F {:.1})\n",
                c.total_labour_force, c.male_labour_force, c.female_labour_force
            ));
        }
        Section::Unavailable { error } => {
            out.push_str(&format!("Current indicators unavailable: {error}\n"));
        }
    }

    for finding in &analysis.executive_summary.key_findings {
        out.push_str(&format!("- {finding}\n"));
    }
    out
}
