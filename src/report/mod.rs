//! Reporting: formatted text summaries and JSON export.
//!
//! We keep formatting code in one place so:
//! - the analysis code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

pub mod format;

pub use format::{format_analysis_summary, format_transform_summary, format_validation_report};

use serde::Serialize;

use crate::error::PipelineError;

/// Serialize any report section to pretty JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, PipelineError> {
    Ok(serde_json::to_string_pretty(value)?)
}
