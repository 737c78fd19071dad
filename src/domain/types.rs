//! Shared domain types.
//!
//! These types are intentionally lightweight and serializable so they can be:
//!
//! - passed in-memory through the transform/analysis pipeline
//! - exported to JSON by the (out-of-scope) report and chart collaborators
//! - rebuilt deterministically from the same source table

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An in-memory tabular dataset, as handed over by the I/O adapters.
///
/// Cells are strings exactly as read; the empty string means "missing".
/// The core never touches files; whoever parsed CSV/Parquet/Excel builds
/// one of these.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.headers.is_empty()
    }

    /// Cell accessor; out-of-range and empty cells both read as missing.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

/// One extracted survey observation, with canonical field names.
///
/// Invariant (enforced by the validator, not here): `region_code` is the
/// same across every record of a validated extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub indicator_code: String,
    pub indicator_name: Option<String>,
    /// Period code string in one of the two source notations.
    pub period_code: String,
    /// Human-readable period label if the source carried one.
    pub period_label: Option<String>,
    pub region_code: String,
    pub region_name: Option<String>,
    pub gender_code: String,
    pub gender_name: Option<String>,
    /// Raw value cell, still unparsed; cleaning happens in the transformer.
    pub value: Option<String>,
    pub flag_codes: Option<String>,
}

/// A calendar quarter derived from a period code.
///
/// Never persisted on its own, always recomputed from the source string, so
/// the parse is the single source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    /// Quarter in `1..=4`.
    pub quarter: u8,
    /// First month of the period window (see the Notation-B caveat in
    /// `ingest::period`); drives `approx_date`.
    pub month_start: u32,
    /// First day of `month_start`.
    pub approx_date: NaiveDate,
}

/// One analysis-ready row: the raw record plus parsed/derived fields.
///
/// Created once per transform pass and immutable afterwards; the statistics
/// engine and the analyzers only ever read these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRow {
    pub indicator_code: String,
    pub period_code: String,
    pub region_code: String,
    pub region_name: String,
    pub gender_code: String,
    pub gender_name: String,

    /// Cleaned observation. `None` when the source cell was missing or not
    /// coercible to a number; negatives are clamped to zero upstream.
    pub value: Option<f64>,

    // Temporal fields; all `None` when the period code did not parse.
    pub year: Option<i32>,
    pub quarter: Option<u8>,
    pub quarter_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub decade: Option<i32>,
    pub fiscal_period: Option<String>,
    pub season: Option<String>,

    pub is_national: bool,
    pub is_total_gender: bool,
    /// IQR-flagged outlier (flagged, never removed).
    pub is_outlier: bool,
}

impl AnalysisRow {
    /// Sort key for the deterministic output ordering: date, then region
    /// code, then gender code. Undated rows sort last.
    pub fn sort_key(&self) -> (bool, Option<NaiveDate>, &str, &str) {
        (
            self.date.is_none(),
            self.date,
            self.region_code.as_str(),
            self.gender_code.as_str(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_treats_blank_as_missing() {
        let t = RawTable::new(
            vec!["a".into(), "b".into()],
            vec![vec!["x".into(), "  ".into()]],
        );
        assert_eq!(t.cell(0, 0), Some("x"));
        assert_eq!(t.cell(0, 1), None);
        assert_eq!(t.cell(0, 2), None);
        assert_eq!(t.cell(1, 0), None);
    }

    #[test]
    fn undated_rows_sort_after_dated_ones() {
        let dated = AnalysisRow {
            indicator_code: "ENE_FDT".into(),
            period_code: "2023-V01".into(),
            region_code: "CHL14".into(),
            region_name: "Región de Los Ríos".into(),
            gender_code: "_T".into(),
            gender_name: "Ambos sexos".into(),
            value: Some(1.0),
            year: Some(2023),
            quarter: Some(1),
            quarter_name: Some("ene-mar".into()),
            date: NaiveDate::from_ymd_opt(2023, 1, 1),
            decade: Some(2020),
            fiscal_period: Some("FY2023".into()),
            season: Some("Verano".into()),
            is_national: false,
            is_total_gender: true,
            is_outlier: false,
        };
        let mut undated = dated.clone();
        undated.date = None;

        assert!(dated.sort_key() < undated.sort_key());
    }
}
