//! The cleaning and enrichment pipeline.
//!
//! A fixed sequence of steps turns a validated raw table into sorted
//! [`AnalysisRow`]s:
//!
//! 1. extract canonical records (header renaming, row screening)
//! 2. parse period codes into temporal fields
//! 3. map region and gender codes through the catalogs
//! 4. coerce the value column (non-numeric → null, negatives → 0)
//! 5. derive presentation columns (quarter name, decade, fiscal period,
//!    season, national/total flags)
//! 6. flag IQR outliers (flag only, never drop)
//! 7. stable-sort by date, region, gender
//!
//! Every lossy step is counted in [`TransformSummary`] so callers can audit
//! what the cleaning did.

use serde::Serialize;

use crate::config::{AnalysisConfig, RegionConfig};
use crate::domain::columns;
use crate::domain::{AnalysisRow, RawRecord, RawTable};
use crate::error::PipelineError;
use crate::ingest::{catalog, extract_records, period, HeaderMap};
use crate::stats::descriptive::quantile;
use crate::validate::{ValidationReport, Validator};

/// Counters describing what one transform pass did to the data.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransformSummary {
    pub rows_in: usize,
    pub rows_out: usize,
    /// Rows skipped at extraction for missing identifying cells.
    pub rows_skipped: usize,
    /// Value cells that were present but not coercible to a number.
    pub non_numeric_values: usize,
    /// Negative values clamped to zero.
    pub negatives_clamped: usize,
    /// Period codes that matched neither notation.
    pub unparsed_periods: usize,
    /// Rows flagged as IQR outliers.
    pub outliers_flagged: usize,
    /// Columns the pipeline derived on top of the canonical ones.
    pub new_columns: Vec<&'static str>,
}

/// Names of the derived columns, in the order they are populated.
pub const DERIVED_COLUMNS: [&str; 8] = [
    "year",
    "quarter",
    "quarter_name",
    "date",
    "decade",
    "fiscal_period",
    "season",
    "is_outlier",
];

/// Transform result: the analysis rows plus the audit trail.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub rows: Vec<AnalysisRow>,
    pub summary: TransformSummary,
    pub validation: ValidationReport,
}

pub struct Transformer {
    region: RegionConfig,
    analysis: AnalysisConfig,
}

impl Transformer {
    pub fn new(region: RegionConfig, analysis: AnalysisConfig) -> Self {
        Self { region, analysis }
    }

    /// Run the full pipeline. Refuses to proceed when any hard validation
    /// check fails; soft findings are carried in the returned report.
    pub fn transform(&self, table: &RawTable) -> Result<TransformOutput, PipelineError> {
        let validator = Validator::new(&self.region, &self.analysis);
        let validation = validator.validate(table, &columns::REQUIRED, &[columns::VALUE]);
        if !validation.overall_valid() {
            return Err(self.hard_error(table, &validation));
        }

        let extracted = extract_records(table);
        let mut summary = TransformSummary {
            rows_in: extracted.rows_read,
            rows_skipped: extracted.issues.len(),
            new_columns: DERIVED_COLUMNS.to_vec(),
            ..TransformSummary::default()
        };

        let mut rows: Vec<AnalysisRow> = extracted
            .records
            .iter()
            .map(|record| self.build_row(record, &mut summary))
            .collect();

        flag_outliers(&mut rows, self.analysis.iqr_multiplier, &mut summary);
        rows.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        summary.rows_out = rows.len();
        log::info!(
            "transform: {} rows in, {} out ({} skipped, {} non-numeric, {} clamped, {} unparsed periods, {} outliers)",
            summary.rows_in,
            summary.rows_out,
            summary.rows_skipped,
            summary.non_numeric_values,
            summary.negatives_clamped,
            summary.unparsed_periods,
            summary.outliers_flagged,
        );

        Ok(TransformOutput {
            rows,
            summary,
            validation,
        })
    }

    /// Map the first failed hard check onto its dedicated error variant.
    fn hard_error(&self, table: &RawTable, validation: &ValidationReport) -> PipelineError {
        if !validation.not_empty {
            return PipelineError::EmptyTable;
        }
        let headers = HeaderMap::build(table);
        if !validation.has_required_columns {
            let missing = headers
                .missing(&columns::REQUIRED)
                .iter()
                .map(|s| s.to_string())
                .collect();
            return PipelineError::MissingColumns(missing);
        }
        if !validation.single_region {
            let mut found: Vec<String> = Vec::new();
            if let Some(col) = headers.index(columns::REGION_CODE) {
                for row in 0..table.rows.len() {
                    if let Some(code) = table.cell(row, col) {
                        if !found.iter().any(|c| c == code) {
                            found.push(code.to_string());
                        }
                    }
                }
            }
            return PipelineError::RegionMismatch {
                expected: self.region.region_code.clone(),
                found,
            };
        }
        if !validation.numeric_columns_valid {
            return PipelineError::NonNumericColumn(columns::VALUE.to_string());
        }
        PipelineError::ValidationFailed(validation.errors.join("; "))
    }

    fn build_row(&self, record: &RawRecord, summary: &mut TransformSummary) -> AnalysisRow {
        let value = match record.value.as_deref() {
            None => None,
            Some(raw) => match raw.parse::<f64>() {
                Ok(v) if v < 0.0 => {
                    summary.negatives_clamped += 1;
                    log::warn!("negative value {v} clamped to 0 in {}", record.period_code);
                    Some(0.0)
                }
                Ok(v) => Some(v),
                Err(_) => {
                    summary.non_numeric_values += 1;
                    None
                }
            },
        };

        let parsed = period::parse_period(&record.period_code);
        if parsed.is_none() {
            summary.unparsed_periods += 1;
        }

        let (year, quarter, quarter_name, date) = match parsed {
            Some(p) => (
                Some(p.year),
                Some(p.quarter),
                period::quarter_name(p.quarter).map(str::to_string),
                Some(p.approx_date),
            ),
            None => (None, None, None, None),
        };

        AnalysisRow {
            indicator_code: record.indicator_code.clone(),
            period_code: record.period_code.clone(),
            region_code: record.region_code.clone(),
            region_name: catalog::region_name(&record.region_code),
            gender_code: record.gender_code.clone(),
            gender_name: catalog::gender_name(&record.gender_code),
            value,
            year,
            quarter,
            quarter_name,
            date,
            decade: year.map(|y| (y / 10) * 10),
            fiscal_period: year.map(|y| format!("FY{y}")),
            season: quarter.and_then(season_name).map(str::to_string),
            is_national: record.region_code == "_T",
            is_total_gender: record.gender_code == "_T",
            is_outlier: false,
        }
    }
}

/// Southern-hemisphere season of a calendar quarter.
fn season_name(quarter: u8) -> Option<&'static str> {
    match quarter {
        1 => Some("Verano"),
        2 => Some("Otoño"),
        3 => Some("Invierno"),
        4 => Some("Primavera"),
        _ => None,
    }
}

/// Flag values outside `[Q1 - k*IQR, Q3 + k*IQR]`. Flagging only; the rows
/// stay in the output.
fn flag_outliers(rows: &mut [AnalysisRow], k: f64, summary: &mut TransformSummary) {
    let values: Vec<f64> = rows.iter().filter_map(|r| r.value).collect();
    if values.len() < 4 {
        return;
    }
    let mut sorted = values;
    sorted.sort_by(|a, b| a.total_cmp(b));
    let q1 = quantile(&sorted, 0.25);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lo = q1 - k * iqr;
    let hi = q3 + k * iqr;

    for row in rows.iter_mut() {
        if let Some(v) = row.value {
            if v < lo || v > hi {
                row.is_outlier = true;
                summary.outliers_flagged += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: Vec<Vec<&str>>) -> RawTable {
        RawTable::new(
            vec![
                "indicator_code".into(),
                "period_code".into(),
                "region_code".into(),
                "gender_code".into(),
                "value".into(),
            ],
            rows.into_iter()
                .map(|r| r.into_iter().map(str::to_string).collect())
                .collect(),
        )
    }

    fn transformer() -> Transformer {
        Transformer::new(RegionConfig::default(), AnalysisConfig::default())
    }

    #[test]
    fn happy_path_derives_temporal_columns() {
        let out = transformer()
            .transform(&table(vec![
                vec!["ENE_FDT", "2023-V04", "CHL14", "_T", "185.3"],
                vec!["ENE_FDT", "2023 ene-mar", "CHL14", "_T", "183.1"],
            ]))
            .unwrap();

        assert_eq!(out.rows.len(), 2);
        // Sorted by date: ene-mar (Jan) before V04 (Apr).
        let first = &out.rows[0];
        assert_eq!(first.period_code, "2023 ene-mar");
        assert_eq!(first.quarter, Some(1));
        assert_eq!(first.quarter_name.as_deref(), Some("ene-mar"));
        assert_eq!(first.decade, Some(2020));
        assert_eq!(first.fiscal_period.as_deref(), Some("FY2023"));
        assert_eq!(first.season.as_deref(), Some("Verano"));
        assert!(first.is_total_gender);
        assert!(!first.is_national);

        let second = &out.rows[1];
        assert_eq!(second.season.as_deref(), Some("Otoño"));
    }

    #[test]
    fn negatives_are_clamped_and_counted() {
        let out = transformer()
            .transform(&table(vec![
                vec!["ENE_FDT", "2023-V01", "CHL14", "_T", "-50"],
                vec!["ENE_FDT", "2023-V02", "CHL14", "_T", "120"],
            ]))
            .unwrap();

        assert_eq!(out.rows[0].value, Some(0.0));
        assert_eq!(out.summary.negatives_clamped, 1);
        assert_eq!(out.summary.rows_out, 2);
    }

    #[test]
    fn non_numeric_values_become_null_and_are_counted() {
        let out = transformer()
            .transform(&table(vec![
                vec!["ENE_FDT", "2023-V01", "CHL14", "_T", "abc"],
                vec!["ENE_FDT", "2023-V02", "CHL14", "_T", "120"],
            ]))
            .unwrap();

        assert_eq!(out.rows.iter().filter(|r| r.value.is_none()).count(), 1);
        assert_eq!(out.summary.non_numeric_values, 1);
    }

    #[test]
    fn unparseable_period_keeps_the_row_with_null_temporal_fields() {
        let out = transformer()
            .transform(&table(vec![
                vec!["ENE_FDT", "not-a-period", "CHL14", "_T", "100"],
                vec!["ENE_FDT", "2023-V01", "CHL14", "_T", "120"],
            ]))
            .unwrap();

        assert_eq!(out.summary.unparsed_periods, 1);
        assert_eq!(out.rows.len(), 2);
        // Undated rows sort last.
        let last = out.rows.last().unwrap();
        assert_eq!(last.period_code, "not-a-period");
        assert_eq!(last.year, None);
        assert_eq!(last.date, None);
    }

    #[test]
    fn mixed_regions_are_refused() {
        let err = transformer()
            .transform(&table(vec![
                vec!["ENE_FDT", "2023-V01", "CHL14", "_T", "100"],
                vec!["ENE_FDT", "2023-V01", "CHL13", "_T", "900"],
            ]))
            .unwrap_err();

        match err {
            PipelineError::RegionMismatch { expected, found } => {
                assert_eq!(expected, "CHL14");
                assert_eq!(found.len(), 2);
            }
            other => unreachable!("unexpected error: {other}"),
        }
    }

    #[test]
    fn outliers_are_flagged_but_kept() {
        let values = ["10", "12", "11", "13", "12", "100", "11", "10"];
        let codes = [
            "2020-V01", "2020-V04", "2020-V07", "2020-V10", "2021-V01", "2021-V04", "2021-V07",
            "2021-V10",
        ];
        let rows = codes
            .iter()
            .zip(values.iter())
            .map(|(code, value)| vec!["ENE_FDT", *code, "CHL14", "_T", *value])
            .collect();
        let out = transformer().transform(&table(rows)).unwrap();

        // Q1 10.75, Q3 12.25: bounds [8.5, 14.5], so only the 100 trips.
        assert_eq!(out.summary.outliers_flagged, 1);
        assert_eq!(out.rows.len(), 8);
        let flagged = out.rows.iter().find(|r| r.is_outlier).unwrap();
        assert_eq!(flagged.value, Some(100.0));
        assert!(out.rows.iter().filter(|r| !r.is_outlier).count() == 7);
    }
}
