//! Run configuration.
//!
//! One explicit settings object, passed by reference into each component.
//! There is deliberately no module-level singleton: a host constructs these
//! once (usually `Default::default()`) and threads them through.

use serde::{Deserialize, Serialize};

/// Which region the whole pipeline is narrowed to.
///
/// Every validated extraction must contain exactly this region code; other
/// codes are a hard error, not a filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionConfig {
    pub region_code: String,
    pub region_name: String,
    /// Indicator the extract is expected to carry (informational).
    pub indicator_code: String,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            region_code: "CHL14".to_string(),
            region_name: "Región de Los Ríos".to_string(),
            indicator_code: "ENE_FDT".to_string(),
        }
    }
}

/// Tunables for cleaning, validation and analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// IQR multiplier `k` for the `[Q1 - k*IQR, Q3 + k*IQR]` outlier bounds.
    pub iqr_multiplier: f64,
    /// Z-score beyond which a value counts as an extreme outlier.
    pub z_score_threshold: f64,
    /// Fraction of Z-score outliers above which a column is flagged.
    pub max_outlier_ratio: f64,
    /// Per-column missing-value ratio above which the column is flagged.
    pub max_missing_ratio: f64,
    /// Absolute tolerance for `|total - (male + female)|` per row.
    pub consistency_tolerance: f64,
    /// Minimum points for trend analysis.
    pub min_points_trend: usize,
    /// Minimum points for seasonal analysis (two years of quarters).
    pub min_points_seasonal: usize,
    /// Minimum points for the first-half / second-half comparison.
    pub min_points_comparative: usize,
    /// Minimum points for the naive forecast.
    pub min_points_forecast: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: 1.5,
            z_score_threshold: 3.0,
            max_outlier_ratio: 0.05,
            max_missing_ratio: 0.3,
            consistency_tolerance: 0.1,
            min_points_trend: 2,
            min_points_seasonal: 8,
            min_points_comparative: 8,
            min_points_forecast: 4,
        }
    }
}
