//! Crate-wide error type.
//!
//! Only *hard* failures surface here (the caller must stop): structural
//! problems the pipeline cannot work around. Everything recoverable
//! (unparseable periods, unmapped codes, clamped negatives, thin sections)
//! is represented as data (counters, warnings, `{error}` sections) instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input table has no rows or no columns.
    #[error("input table is empty")]
    EmptyTable,

    /// One or more required columns are absent after renaming.
    #[error("missing required columns: {0:?}")]
    MissingColumns(Vec<String>),

    /// The table mixes region codes, or none match the configured target.
    #[error("expected single region {expected}, found {found:?}")]
    RegionMismatch {
        expected: String,
        found: Vec<String>,
    },

    /// A column that must be numeric cannot be coerced at all.
    #[error("column `{0}` is not numeric and cannot be coerced")]
    NonNumericColumn(String),

    /// Validation reported hard-check failures; details carried verbatim.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// A result tree could not be rendered to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
