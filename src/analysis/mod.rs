//! Labour-market and demographic analyzers.
//!
//! The analyzers pivot the long analysis rows into aligned per-period series
//! (total / male / female) and compute named report sections. A section that
//! cannot be computed (usually too few data points) degrades to an
//! [`Section::Unavailable`] carrying the reason, and never fails the run.

pub mod demographics;
pub mod labour;

pub use demographics::{DemographicsAnalysis, DemographicsAnalyzer};
pub use labour::{LabourAnalysis, LabourAnalyzer};

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::AnalysisRow;

/// One report section: either its payload or the reason it is missing.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Section<T> {
    Ok(T),
    Unavailable { error: String },
}

impl<T> Section<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Section::Unavailable {
            error: reason.into(),
        }
    }

    pub fn as_ok(&self) -> Option<&T> {
        match self {
            Section::Ok(v) => Some(v),
            Section::Unavailable { .. } => None,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Section::Ok(_))
    }
}

/// The long rows pivoted into one aligned wide series per period.
///
/// A period is included when it has a total-gender observation; the male and
/// female entries for that period are `NaN` when absent, so the three series
/// always share one index.
#[derive(Debug, Clone)]
pub struct LabourSeries {
    pub period_codes: Vec<String>,
    pub dates: Vec<Option<NaiveDate>>,
    pub quarters: Vec<Option<u8>>,
    pub total: Vec<f64>,
    pub male: Vec<f64>,
    pub female: Vec<f64>,
    pub outlier_flags: Vec<bool>,
}

impl LabourSeries {
    /// Pivot sorted analysis rows. Rows without a numeric value are skipped;
    /// input order (already date-sorted by the transformer) is preserved.
    pub fn from_rows(rows: &[AnalysisRow]) -> Self {
        let mut series = LabourSeries {
            period_codes: Vec::new(),
            dates: Vec::new(),
            quarters: Vec::new(),
            total: Vec::new(),
            male: Vec::new(),
            female: Vec::new(),
            outlier_flags: Vec::new(),
        };

        for row in rows.iter().filter(|r| r.is_total_gender) {
            let Some(value) = row.value else { continue };
            series.period_codes.push(row.period_code.clone());
            series.dates.push(row.date);
            series.quarters.push(row.quarter);
            series.total.push(value);
            series.male.push(gender_value(rows, &row.period_code, "M"));
            series.female.push(gender_value(rows, &row.period_code, "F"));
            series.outlier_flags.push(row.is_outlier);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.total.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total.is_empty()
    }
}

fn gender_value(rows: &[AnalysisRow], period_code: &str, gender: &str) -> f64 {
    rows.iter()
        .find(|r| r.period_code == period_code && r.gender_code == gender)
        .and_then(|r| r.value)
        .unwrap_or(f64::NAN)
}

/// Growth figures between the first and last valid observation.
#[derive(Debug, Clone, Serialize)]
pub struct GrowthRates {
    pub total_growth_pct: f64,
    /// Compound quarterly growth rate; zero when the base is zero.
    pub compound_growth_pct: f64,
    pub average_period_growth_pct: f64,
    pub periods: usize,
}

/// Compute growth over a series; errors (as a reason string) on fewer than
/// two finite points or a zero starting value for the total growth.
pub fn calculate_growth_rates(series: &[f64]) -> Result<GrowthRates, String> {
    let values: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();
    if values.len() < 2 {
        return Err(format!(
            "need at least 2 valid observations, found {}",
            values.len()
        ));
    }
    let first = values[0];
    let last = values[values.len() - 1];
    if first == 0.0 {
        return Err("first observation is zero; growth undefined".to_string());
    }

    let periods = values.len() - 1;
    let total_growth_pct = (last - first) / first * 100.0;
    let compound_growth_pct = if first > 0.0 && last > 0.0 {
        ((last / first).powf(1.0 / periods as f64) - 1.0) * 100.0
    } else {
        0.0
    };

    let changes: Vec<f64> = values
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0] * 100.0)
        .collect();
    let average_period_growth_pct = if changes.is_empty() {
        0.0
    } else {
        changes.iter().sum::<f64>() / changes.len() as f64
    };

    Ok(GrowthRates {
        total_growth_pct,
        compound_growth_pct,
        average_period_growth_pct,
        periods,
    })
}

/// Division with an explicit fallback for a zero or non-finite denominator.
pub fn safe_divide(numerator: f64, denominator: f64, default: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        default
    } else {
        numerator / denominator
    }
}

/// Human-readable magnitude: `1.5K`, `2.3M`, `1.1B`.
pub fn format_large_number(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}K", value / 1e3)
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample_rows;

    #[test]
    fn pivot_aligns_the_three_series() {
        let rows = sample_rows(42, 12);
        let series = LabourSeries::from_rows(&rows);
        assert_eq!(series.len(), 12);
        assert_eq!(series.male.len(), 12);
        assert_eq!(series.female.len(), 12);
        // Generated rows are internally consistent.
        for i in 0..series.len() {
            assert!(
                (series.total[i] - (series.male[i] + series.female[i])).abs() < 0.5,
                "period {i} inconsistent"
            );
        }
    }

    #[test]
    fn growth_rates_match_hand_computation() {
        let g = calculate_growth_rates(&[100.0, 110.0, 121.0, 133.0]).unwrap();
        assert!((g.total_growth_pct - 33.0).abs() < 1e-9);
        assert!((g.compound_growth_pct - ((1.33f64).powf(1.0 / 3.0) - 1.0) * 100.0).abs() < 1e-9);
        // Period changes: 10%, 10%, 12/121.
        assert!((g.average_period_growth_pct - (10.0 + 10.0 + 1200.0 / 121.0) / 3.0).abs() < 1e-9);
        assert_eq!(g.periods, 3);
    }

    #[test]
    fn ten_percent_steps_have_clean_compound_growth() {
        let g = calculate_growth_rates(&[100.0, 110.0, 121.0]).unwrap();
        assert!((g.total_growth_pct - 21.0).abs() < 1e-9);
        assert!((g.compound_growth_pct - 10.0).abs() < 1e-9);
        assert!((g.average_period_growth_pct - 10.0).abs() < 1e-9);
        assert_eq!(g.periods, 2);
    }

    #[test]
    fn growth_requires_two_valid_points() {
        assert!(calculate_growth_rates(&[100.0]).is_err());
        assert!(calculate_growth_rates(&[f64::NAN, 100.0]).is_err());
        assert!(calculate_growth_rates(&[0.0, 100.0]).is_err());
    }

    #[test]
    fn safe_divide_falls_back() {
        assert_eq!(safe_divide(10.0, 2.0, 0.0), 5.0);
        assert_eq!(safe_divide(10.0, 0.0, 1.0), 1.0);
        assert_eq!(safe_divide(f64::NAN, 2.0, 1.0), 1.0);
    }

    #[test]
    fn large_numbers_format_compactly() {
        assert_eq!(format_large_number(1500.0), "1.5K");
        assert_eq!(format_large_number(2_300_000.0), "2.3M");
        assert_eq!(format_large_number(1_100_000_000.0), "1.1B");
        assert_eq!(format_large_number(185.3), "185.3");
    }
}
