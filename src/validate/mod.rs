//! Table validation.
//!
//! Every check runs unconditionally and lands in the report, with no
//! short-circuiting, so a failed extraction tells the operator everything
//! that is wrong at once. Checks split into:
//!
//! - **hard**: structure, required columns, single-region invariant, numeric
//!   coercibility. Any failure makes the table unusable downstream.
//! - **soft**: duplicates, missing-data ratio, extreme-outlier ratio,
//!   total-vs-components consistency. Reported (and logged) but the pipeline
//!   continues with degraded data.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::{AnalysisConfig, RegionConfig};
use crate::domain::columns;
use crate::domain::RawTable;
use crate::ingest::HeaderMap;

/// Outcome of one validation pass. Freshly built per call, never shared.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    // Hard checks.
    pub not_empty: bool,
    pub has_required_columns: bool,
    pub single_region: bool,
    pub numeric_columns_valid: bool,

    // Soft checks. Duplicate rows are deliberately report-only: the two
    // upstream implementations disagreed and report-only is the documented
    // policy here.
    pub no_duplicate_rows: bool,
    pub missing_data_acceptable: bool,
    pub outlier_ratio_acceptable: bool,
    pub totals_consistent: bool,

    /// Rows violating `|total - (male + female)| <= tolerance`.
    pub inconsistent_rows: usize,

    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Logical AND of the hard checks only.
    pub fn overall_valid(&self) -> bool {
        self.not_empty
            && self.has_required_columns
            && self.single_region
            && self.numeric_columns_valid
    }

    /// Check-name → pass listing, for reporting.
    pub fn checks(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("not_empty", self.not_empty),
            ("has_required_columns", self.has_required_columns),
            ("single_region", self.single_region),
            ("numeric_columns_valid", self.numeric_columns_valid),
            ("no_duplicate_rows", self.no_duplicate_rows),
            ("missing_data_acceptable", self.missing_data_acceptable),
            ("outlier_ratio_acceptable", self.outlier_ratio_acceptable),
            ("totals_consistent", self.totals_consistent),
        ]
    }
}

/// Result of the standalone consistency check on a wide table.
#[derive(Debug, Clone, Serialize)]
pub struct ConsistencyReport {
    pub consistent: bool,
    pub inconsistent_rows: usize,
    pub errors: Vec<String>,
}

pub struct Validator<'a> {
    region: &'a RegionConfig,
    analysis: &'a AnalysisConfig,
}

impl<'a> Validator<'a> {
    pub fn new(region: &'a RegionConfig, analysis: &'a AnalysisConfig) -> Self {
        Self { region, analysis }
    }

    /// Run the full check battery against a raw table.
    ///
    /// `required` and `numeric` are canonical column names; pass
    /// [`columns::REQUIRED`] and `[columns::VALUE]` for a survey extract.
    pub fn validate(&self, table: &RawTable, required: &[&str], numeric: &[&str]) -> ValidationReport {
        let headers = HeaderMap::build(table);
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let not_empty = !table.is_empty();
        if !not_empty {
            errors.push("table has no rows or no columns".to_string());
        }

        let missing_cols = headers.missing(required);
        let has_required_columns = missing_cols.is_empty();
        if !has_required_columns {
            errors.push(format!("missing required columns: {missing_cols:?}"));
        }

        let single_region = self.check_single_region(table, &headers, &mut errors);
        let numeric_columns_valid = check_numeric_columns(table, &headers, numeric, &mut errors);
        let no_duplicate_rows = check_no_duplicates(table, &mut warnings);
        let missing_data_acceptable =
            self.check_missing_data(table, &mut warnings);
        let outlier_ratio_acceptable =
            self.check_outlier_ratio(table, &headers, numeric, &mut warnings);

        let consistency = self.check_consistency(table, &headers);
        let totals_consistent = consistency.consistent;
        let inconsistent_rows = consistency.inconsistent_rows;
        warnings.extend(consistency.errors);

        let report = ValidationReport {
            not_empty,
            has_required_columns,
            single_region,
            numeric_columns_valid,
            no_duplicate_rows,
            missing_data_acceptable,
            outlier_ratio_acceptable,
            totals_consistent,
            inconsistent_rows,
            errors,
            warnings,
        };

        let passed = report.checks().iter().filter(|(_, ok)| *ok).count();
        log::info!("validation: {passed}/{} checks passed", report.checks().len());
        report
    }

    /// Standalone total-vs-components check for wide tables.
    pub fn validate_data_consistency(&self, table: &RawTable) -> ConsistencyReport {
        let headers = HeaderMap::build(table);
        self.check_consistency(table, &headers)
    }

    fn check_single_region(
        &self,
        table: &RawTable,
        headers: &HeaderMap,
        errors: &mut Vec<String>,
    ) -> bool {
        let Some(col) = headers.index(columns::REGION_CODE) else {
            errors.push("region-code column absent; single-region invariant unverifiable".to_string());
            return false;
        };

        let mut seen: BTreeSet<String> = BTreeSet::new();
        for row in 0..table.rows.len() {
            if let Some(code) = table.cell(row, col) {
                seen.insert(code.to_string());
            }
        }

        let target = &self.region.region_code;
        let ok = seen.len() == 1 && seen.contains(target);
        if !ok {
            errors.push(format!(
                "expected single region {target}, found {:?}",
                seen.iter().collect::<Vec<_>>()
            ));
        }
        ok
    }

    fn check_missing_data(&self, table: &RawTable, warnings: &mut Vec<String>) -> bool {
        if table.rows.is_empty() {
            return true;
        }
        let n = table.rows.len() as f64;
        let mut flagged = Vec::new();
        for (col, name) in table.headers.iter().enumerate() {
            let missing = (0..table.rows.len())
                .filter(|&row| table.cell(row, col).is_none())
                .count() as f64;
            if missing / n > self.analysis.max_missing_ratio {
                flagged.push(format!("{name} ({:.0}%)", missing / n * 100.0));
            }
        }
        if flagged.is_empty() {
            true
        } else {
            warnings.push(format!("columns above missing-data threshold: {flagged:?}"));
            false
        }
    }

    fn check_outlier_ratio(
        &self,
        table: &RawTable,
        headers: &HeaderMap,
        numeric: &[&str],
        warnings: &mut Vec<String>,
    ) -> bool {
        if table.rows.is_empty() {
            return true;
        }
        let mut total_outliers = 0usize;
        for name in numeric {
            let Some(col) = headers.index(name) else { continue };
            let values = numeric_column(table, col);
            if values.len() < 2 {
                continue;
            }
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                / (values.len() - 1) as f64;
            let std = var.sqrt();
            if std <= 0.0 {
                continue;
            }
            total_outliers += values
                .iter()
                .filter(|v| ((*v - mean) / std).abs() > self.analysis.z_score_threshold)
                .count();
        }

        let ratio = total_outliers as f64 / table.rows.len() as f64;
        if total_outliers > 0 {
            warnings.push(format!(
                "{total_outliers} extreme Z-score outliers ({:.1}% of rows)",
                ratio * 100.0
            ));
        }
        ratio < self.analysis.max_outlier_ratio
    }

    fn check_consistency(&self, table: &RawTable, headers: &HeaderMap) -> ConsistencyReport {
        let (Some(total_col), Some(male_col), Some(female_col)) = (
            headers.index(columns::TOTAL),
            headers.index(columns::MALE),
            headers.index(columns::FEMALE),
        ) else {
            // Not a wide table; the check is not applicable and passes.
            return ConsistencyReport {
                consistent: true,
                inconsistent_rows: 0,
                errors: Vec::new(),
            };
        };

        let tolerance = self.analysis.consistency_tolerance;
        let mut inconsistent = 0usize;
        let mut errors = Vec::new();

        for row in 0..table.rows.len() {
            let parse = |col: usize| table.cell(row, col).and_then(|s| s.parse::<f64>().ok());
            let (Some(total), Some(male), Some(female)) =
                (parse(total_col), parse(male_col), parse(female_col))
            else {
                continue;
            };
            let gap = (total - (male + female)).abs();
            if gap > tolerance {
                inconsistent += 1;
                if errors.len() < 10 {
                    errors.push(format!(
                        "row {row}: total {total} != male {male} + female {female} (gap {gap:.3})"
                    ));
                }
            }
        }

        if inconsistent > 0 {
            log::warn!("{inconsistent} rows fail the total-vs-components consistency check");
        }
        ConsistencyReport {
            consistent: inconsistent == 0,
            inconsistent_rows: inconsistent,
            errors,
        }
    }
}

/// Column passes when it holds at least one parseable number; a column with
/// no parseable entries at all cannot be coerced and is a hard failure.
/// Individually bad cells are left for the transformer to null out and count.
fn check_numeric_columns(
    table: &RawTable,
    headers: &HeaderMap,
    numeric: &[&str],
    errors: &mut Vec<String>,
) -> bool {
    let mut ok = true;
    for name in numeric {
        let Some(col) = headers.index(name) else { continue };
        let mut non_missing = 0usize;
        let mut parseable = 0usize;
        for row in 0..table.rows.len() {
            if let Some(cell) = table.cell(row, col) {
                non_missing += 1;
                if cell.parse::<f64>().is_ok() {
                    parseable += 1;
                }
            }
        }
        if non_missing > 0 && parseable == 0 {
            errors.push(format!("column `{name}` has no numeric entries"));
            ok = false;
        }
    }
    ok
}

fn check_no_duplicates(table: &RawTable, warnings: &mut Vec<String>) -> bool {
    let mut seen = BTreeSet::new();
    let mut duplicates = 0usize;
    for row in &table.rows {
        if !seen.insert(row.join("\u{1f}")) {
            duplicates += 1;
        }
    }
    if duplicates > 0 {
        warnings.push(format!("{duplicates} fully-duplicate rows"));
        log::warn!("found {duplicates} duplicate rows");
        return false;
    }
    true
}

fn numeric_column(table: &RawTable, col: usize) -> Vec<f64> {
    (0..table.rows.len())
        .filter_map(|row| table.cell(row, col).and_then(|s| s.parse::<f64>().ok()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::columns::REQUIRED;

    fn configs() -> (RegionConfig, AnalysisConfig) {
        (RegionConfig::default(), AnalysisConfig::default())
    }

    fn survey_table(region_codes: &[&str]) -> RawTable {
        let headers = vec![
            "indicator_code".to_string(),
            "period_code".to_string(),
            "region_code".to_string(),
            "gender_code".to_string(),
            "value".to_string(),
        ];
        let rows = region_codes
            .iter()
            .enumerate()
            .map(|(i, code)| {
                vec![
                    "ENE_FDT".to_string(),
                    format!("2023-V{:02}", (i % 4) + 1),
                    code.to_string(),
                    "_T".to_string(),
                    format!("{}", 100 + i),
                ]
            })
            .collect();
        RawTable::new(headers, rows)
    }

    #[test]
    fn valid_single_region_table_passes_hard_checks() {
        let (region, analysis) = configs();
        let validator = Validator::new(&region, &analysis);
        let table = survey_table(&["CHL14", "CHL14", "CHL14"]);

        let report = validator.validate(&table, &REQUIRED, &[columns::VALUE]);
        assert!(report.overall_valid(), "errors: {:?}", report.errors);
        assert!(report.no_duplicate_rows);
    }

    #[test]
    fn missing_region_column_fails_and_reports() {
        let (region, analysis) = configs();
        let validator = Validator::new(&region, &analysis);
        let table = RawTable::new(
            vec!["indicator_code".into(), "period_code".into(), "value".into()],
            vec![vec!["ENE_FDT".into(), "2023-V01".into(), "100".into()]],
        );

        let report = validator.validate(&table, &REQUIRED, &[columns::VALUE]);
        assert!(!report.has_required_columns);
        assert!(!report.overall_valid());
    }

    #[test]
    fn two_regions_fail_even_when_one_matches_the_target() {
        let (region, analysis) = configs();
        let validator = Validator::new(&region, &analysis);
        let table = survey_table(&["CHL14", "CHL13"]);

        let report = validator.validate(&table, &REQUIRED, &[columns::VALUE]);
        assert!(!report.single_region);
        assert!(!report.overall_valid());
    }

    #[test]
    fn duplicates_are_reported_but_do_not_invalidate() {
        let (region, analysis) = configs();
        let validator = Validator::new(&region, &analysis);
        let mut table = survey_table(&["CHL14"]);
        table.rows.push(table.rows[0].clone());

        let report = validator.validate(&table, &REQUIRED, &[columns::VALUE]);
        assert!(!report.no_duplicate_rows);
        assert!(report.overall_valid());
        assert!(report.warnings.iter().any(|w| w.contains("duplicate")));
    }

    #[test]
    fn fully_textual_value_column_is_a_hard_error() {
        let (region, analysis) = configs();
        let validator = Validator::new(&region, &analysis);
        let mut table = survey_table(&["CHL14", "CHL14"]);
        for row in &mut table.rows {
            row[4] = "n/a".to_string();
        }

        let report = validator.validate(&table, &REQUIRED, &[columns::VALUE]);
        assert!(!report.numeric_columns_valid);
        assert!(!report.overall_valid());
    }

    fn wide_table(totals: &[(f64, f64, f64)]) -> RawTable {
        let headers = vec![
            "region".to_string(),
            "fuerza_de_trabajo".to_string(),
            "hombres".to_string(),
            "mujeres".to_string(),
        ];
        let rows = totals
            .iter()
            .map(|(t, m, f)| {
                vec![
                    "CHL14".to_string(),
                    t.to_string(),
                    m.to_string(),
                    f.to_string(),
                ]
            })
            .collect();
        RawTable::new(headers, rows)
    }

    #[test]
    fn consistency_passes_on_exact_sums() {
        let (region, analysis) = configs();
        let validator = Validator::new(&region, &analysis);
        let table = wide_table(&[(100_000.0, 55_000.0, 45_000.0), (102_000.0, 56_000.0, 46_000.0)]);

        let report = validator.validate_data_consistency(&table);
        assert!(report.consistent);
        assert_eq!(report.inconsistent_rows, 0);
    }

    #[test]
    fn consistency_counts_exactly_the_violating_rows() {
        let (region, analysis) = configs();
        let validator = Validator::new(&region, &analysis);
        let table = wide_table(&[
            (100_000.0, 55_000.0, 45_000.0),
            (102_000.0, 56_000.0, 40_000.0), // off by 6000
        ]);

        let report = validator.validate_data_consistency(&table);
        assert!(!report.consistent);
        assert_eq!(report.inconsistent_rows, 1);
        assert!(!report.errors.is_empty());
    }
}
