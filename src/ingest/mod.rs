//! Raw-table normalization.
//!
//! This module turns a heterogeneous survey extract into canonical
//! [`RawRecord`]s that are safe to validate and transform.
//!
//! Design goals:
//! - **Dual schemes**: INE metadata headers and snake_case headers both work
//! - **Row-level issues** are collected and reported, never thrown
//! - **Deterministic behavior**: no hidden state, no I/O
//! - **Separation of concerns**: no cleaning or statistics here

pub mod catalog;
pub mod period;

use std::collections::HashMap;

use crate::domain::columns;
use crate::domain::{RawRecord, RawTable};

/// Canonical-name → column-index lookup for one table.
#[derive(Debug, Clone)]
pub struct HeaderMap {
    indices: HashMap<&'static str, usize>,
}

impl HeaderMap {
    /// Build the lookup, accepting either source naming scheme.
    pub fn build(table: &RawTable) -> Self {
        let mut indices = HashMap::new();
        for (idx, name) in table.headers.iter().enumerate() {
            let name = normalize_header_name(name);
            let canonical = columns::canonical_name(&name)
                .or_else(|| columns::canonical_name(&name.to_ascii_lowercase()));
            if let Some(canonical) = canonical {
                // First occurrence wins if a header repeats.
                indices.entry(canonical).or_insert(idx);
            }
        }
        Self { indices }
    }

    pub fn index(&self, canonical: &str) -> Option<usize> {
        self.indices.get(canonical).copied()
    }

    pub fn contains(&self, canonical: &str) -> bool {
        self.indices.contains_key(canonical)
    }

    /// Canonical columns missing from the table, out of `required`.
    pub fn missing<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|c| !self.contains(c))
            .collect()
    }
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on
    // the first header. If we don't strip it, schema validation will
    // incorrectly report missing columns.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

/// A row-level problem encountered during extraction.
#[derive(Debug, Clone)]
pub struct RowIssue {
    /// Zero-based row index into `RawTable::rows`.
    pub row: usize,
    pub message: String,
}

/// Extraction output: canonical records plus collected row issues.
#[derive(Debug, Clone)]
pub struct ExtractedRecords {
    pub records: Vec<RawRecord>,
    pub issues: Vec<RowIssue>,
    pub rows_read: usize,
}

/// Extract canonical [`RawRecord`]s from a raw table.
///
/// Rows missing one of the identifying cells (indicator, period, region or
/// gender code) are skipped and counted; a missing value cell is kept as
/// `None` so the transformer can count it instead.
pub fn extract_records(table: &RawTable) -> ExtractedRecords {
    let headers = HeaderMap::build(table);
    let mut records = Vec::with_capacity(table.rows.len());
    let mut issues = Vec::new();

    for row in 0..table.rows.len() {
        match extract_row(table, &headers, row) {
            Ok(record) => records.push(record),
            Err(message) => issues.push(RowIssue { row, message }),
        }
    }

    if !issues.is_empty() {
        log::warn!(
            "extraction skipped {} of {} rows (missing identifying cells)",
            issues.len(),
            table.rows.len()
        );
    }

    ExtractedRecords {
        records,
        issues,
        rows_read: table.rows.len(),
    }
}

fn extract_row(table: &RawTable, headers: &HeaderMap, row: usize) -> Result<RawRecord, String> {
    let required = |name: &str| -> Result<String, String> {
        headers
            .index(name)
            .and_then(|col| table.cell(row, col))
            .map(str::to_string)
            .ok_or_else(|| format!("missing required value `{name}`"))
    };
    let optional = |name: &str| -> Option<String> {
        headers
            .index(name)
            .and_then(|col| table.cell(row, col))
            .map(str::to_string)
    };

    Ok(RawRecord {
        indicator_code: required(columns::INDICATOR_CODE)?,
        indicator_name: optional(columns::INDICATOR),
        period_code: required(columns::PERIOD_CODE)?,
        period_label: optional(columns::PERIOD),
        region_code: required(columns::REGION_CODE)?,
        region_name: optional(columns::REGION),
        gender_code: required(columns::GENDER_CODE)?,
        gender_name: optional(columns::GENDER),
        value: optional(columns::VALUE),
        flag_codes: optional(columns::FLAG_CODES),
    })
}
