//! The labour-force analyzer.
//!
//! Produces the full report: current indicators, historical trends, gender
//! split, seasonality, growth patterns, a first-half / second-half
//! comparison, a short linear forecast and an executive summary. Each
//! section guards its own minimum-data requirement.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::{AnalysisConfig, RegionConfig};
use crate::domain::AnalysisRow;
use crate::stats::descriptive::{mean, sample_std};
use crate::stats::ols::fit_line;
use crate::stats::{detect_change_points, trend_analysis, ChangePoint, TrendAnalysis};

use super::{
    calculate_growth_rates, format_large_number, safe_divide, GrowthRates, LabourSeries, Section,
};

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    pub region_code: String,
    pub region_name: String,
    pub indicator_code: String,
    pub periods_analyzed: usize,
    pub first_period: Option<String>,
    pub last_period: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentIndicators {
    pub period: String,
    pub total_labour_force: f64,
    pub male_labour_force: f64,
    pub female_labour_force: f64,
    /// Female share of the labour force, in percent; zero-guarded.
    pub female_participation_pct: f64,
    pub male_participation_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesTrend {
    pub growth: GrowthRates,
    /// `"increasing"`, `"decreasing"` or `"stable"` from the fitted slope
    /// against 1% of the series mean.
    pub trend_direction: &'static str,
    pub coefficient_of_variation_pct: f64,
    /// Mean of `|pct_change|` between consecutive periods, in percent.
    pub average_absolute_change_pct: f64,
    /// Largest single `|pct_change|`, in percent.
    pub max_change_pct: f64,
    pub outliers_flagged: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoricalTrends {
    pub total: SeriesTrend,
    pub male: Option<SeriesTrend>,
    pub female: Option<SeriesTrend>,
    pub statistical_trend: Option<TrendAnalysis>,
    pub change_points: Vec<ChangePoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenderAnalysis {
    pub average_female_participation_pct: f64,
    pub average_male_participation_pct: f64,
    /// Male-to-female ratio; 1.0 when undefined.
    pub participation_ratio: f64,
    pub male_growth_pct: f64,
    pub female_growth_pct: f64,
    /// `"male"` or `"female"`, by total growth.
    pub growth_leader: &'static str,
    pub growth_gap_pct: f64,
    pub male_volatility_pct: f64,
    pub female_volatility_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuarterProfile {
    pub quarter: u8,
    pub mean: f64,
    pub std: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonalPatterns {
    pub by_quarter: Vec<QuarterProfile>,
    pub peak_quarter: u8,
    pub low_quarter: u8,
    pub seasonal_variation_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GrowthPatterns {
    pub average_change: f64,
    pub average_pct_change: f64,
    pub max_increase: f64,
    pub max_decrease: f64,
    pub positive_periods: usize,
    pub negative_periods: usize,
    /// Year-over-year percent changes (lag 4), oldest first.
    pub year_over_year_pct: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparativeAnalysis {
    pub first_half_average: f64,
    pub second_half_average: f64,
    pub improvement_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Forecast {
    pub next_period: f64,
    pub following_period: f64,
    pub trend_magnitude: f64,
    /// `"low"` or `"medium"`; a naive linear extrapolation never earns more.
    pub confidence: &'static str,
    pub methodology: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutiveSummary {
    pub key_findings: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LabourAnalysis {
    pub metadata: AnalysisMetadata,
    pub current_indicators: Section<CurrentIndicators>,
    pub historical_trends: Section<HistoricalTrends>,
    pub gender_analysis: Section<GenderAnalysis>,
    pub seasonal_patterns: Section<SeasonalPatterns>,
    pub growth_patterns: Section<GrowthPatterns>,
    pub comparative_analysis: Section<ComparativeAnalysis>,
    pub forecasts: Section<Forecast>,
    pub executive_summary: ExecutiveSummary,
}

pub struct LabourAnalyzer {
    region: RegionConfig,
    analysis: AnalysisConfig,
}

impl LabourAnalyzer {
    pub fn new(region: RegionConfig, analysis: AnalysisConfig) -> Self {
        Self { region, analysis }
    }

    pub fn analyze(&self, rows: &[AnalysisRow]) -> LabourAnalysis {
        let series = LabourSeries::from_rows(rows);
        log::info!("labour analysis over {} periods", series.len());

        let metadata = AnalysisMetadata {
            region_code: self.region.region_code.clone(),
            region_name: self.region.region_name.clone(),
            indicator_code: self.region.indicator_code.clone(),
            periods_analyzed: series.len(),
            first_period: series.period_codes.first().cloned(),
            last_period: series.period_codes.last().cloned(),
        };

        let current_indicators = self.current_indicators(&series);
        let historical_trends = self.historical_trends(&series);
        let gender_analysis = self.gender_analysis(&series);
        let seasonal_patterns = self.seasonal_patterns(&series);
        let growth_patterns = self.growth_patterns(&series);
        let comparative_analysis = self.comparative_analysis(&series);
        let forecasts = self.forecasts(&series);
        let executive_summary =
            self.executive_summary(&current_indicators, &historical_trends, &gender_analysis);

        LabourAnalysis {
            metadata,
            current_indicators,
            historical_trends,
            gender_analysis,
            seasonal_patterns,
            growth_patterns,
            comparative_analysis,
            forecasts,
            executive_summary,
        }
    }

    fn current_indicators(&self, series: &LabourSeries) -> Section<CurrentIndicators> {
        if series.is_empty() {
            return Section::unavailable("no periods with a total observation");
        }
        let i = series.len() - 1;
        let total = series.total[i];
        let male = series.male[i];
        let female = series.female[i];

        Section::Ok(CurrentIndicators {
            period: series.period_codes[i].clone(),
            total_labour_force: total,
            male_labour_force: male,
            female_labour_force: female,
            female_participation_pct: safe_divide(female, total, 0.0) * 100.0,
            male_participation_pct: safe_divide(male, total, 0.0) * 100.0,
        })
    }

    fn historical_trends(&self, series: &LabourSeries) -> Section<HistoricalTrends> {
        let min = self.analysis.min_points_trend;
        if series.len() < min {
            return Section::unavailable(format!(
                "need at least {min} periods for trends, found {}",
                series.len()
            ));
        }

        let outliers = series.outlier_flags.iter().filter(|f| **f).count();
        let Some(total) = series_trend(&series.total, outliers) else {
            return Section::unavailable("total series has too few valid observations");
        };

        Section::Ok(HistoricalTrends {
            total,
            male: series_trend(&series.male, 0),
            female: series_trend(&series.female, 0),
            statistical_trend: trend_analysis(&series.total),
            change_points: detect_change_points(&series.total, self.analysis.min_points_forecast),
        })
    }

    fn gender_analysis(&self, series: &LabourSeries) -> Section<GenderAnalysis> {
        if series.len() < self.analysis.min_points_trend {
            return Section::unavailable(format!(
                "need at least {} periods for the gender split, found {}",
                self.analysis.min_points_trend,
                series.len()
            ));
        }

        let female_shares: Vec<f64> = series
            .female
            .iter()
            .zip(series.total.iter())
            .filter(|(f, t)| f.is_finite() && **t > 0.0)
            .map(|(f, t)| f / t * 100.0)
            .collect();
        let male_shares: Vec<f64> = series
            .male
            .iter()
            .zip(series.total.iter())
            .filter(|(m, t)| m.is_finite() && **t > 0.0)
            .map(|(m, t)| m / t * 100.0)
            .collect();
        if female_shares.is_empty() || male_shares.is_empty() {
            return Section::unavailable("gender series are empty");
        }

        let male_growth = calculate_growth_rates(&series.male);
        let female_growth = calculate_growth_rates(&series.female);
        let (Ok(male_growth), Ok(female_growth)) = (male_growth, female_growth) else {
            return Section::unavailable("gender series too sparse for growth rates");
        };

        let male_mean = mean_finite(&series.male);
        let female_mean = mean_finite(&series.female);
        // Strict comparison: an exact tie reports the female series.
        let leader = if male_growth.total_growth_pct > female_growth.total_growth_pct {
            "male"
        } else {
            "female"
        };

        Section::Ok(GenderAnalysis {
            average_female_participation_pct: mean(&female_shares),
            average_male_participation_pct: mean(&male_shares),
            participation_ratio: safe_divide(male_mean, female_mean, 1.0),
            male_growth_pct: male_growth.total_growth_pct,
            female_growth_pct: female_growth.total_growth_pct,
            growth_leader: leader,
            growth_gap_pct: (male_growth.total_growth_pct - female_growth.total_growth_pct).abs(),
            male_volatility_pct: volatility_pct(&series.male),
            female_volatility_pct: volatility_pct(&series.female),
        })
    }

    fn seasonal_patterns(&self, series: &LabourSeries) -> Section<SeasonalPatterns> {
        let min = self.analysis.min_points_seasonal;
        if series.len() < min {
            return Section::unavailable(format!(
                "need at least {min} periods for seasonality, found {}",
                series.len()
            ));
        }

        let mut by_quarter: BTreeMap<u8, Vec<f64>> = BTreeMap::new();
        for (value, quarter) in series.total.iter().zip(series.quarters.iter()) {
            if let Some(q) = quarter {
                by_quarter.entry(*q).or_default().push(*value);
            }
        }
        if by_quarter.len() < 2 {
            return Section::unavailable("fewer than two distinct quarters observed");
        }

        let profiles: Vec<QuarterProfile> = by_quarter
            .iter()
            .map(|(q, values)| QuarterProfile {
                quarter: *q,
                mean: mean(values),
                std: sample_std(values),
                count: values.len(),
            })
            .collect();

        // max_by on mean; ties resolve to the later quarter, which is fine
        // for a presentation field.
        let peak = profiles
            .iter()
            .max_by(|a, b| a.mean.total_cmp(&b.mean))
            .map(|p| p.quarter)
            .unwrap_or(1);
        let low = profiles
            .iter()
            .min_by(|a, b| a.mean.total_cmp(&b.mean))
            .map(|p| p.quarter)
            .unwrap_or(1);

        let overall = mean_finite(&series.total);
        let max_mean = profiles.iter().map(|p| p.mean).fold(f64::MIN, f64::max);
        let min_mean = profiles.iter().map(|p| p.mean).fold(f64::MAX, f64::min);

        Section::Ok(SeasonalPatterns {
            by_quarter: profiles,
            peak_quarter: peak,
            low_quarter: low,
            seasonal_variation_pct: safe_divide(max_mean - min_mean, overall, 0.0) * 100.0,
        })
    }

    fn growth_patterns(&self, series: &LabourSeries) -> Section<GrowthPatterns> {
        if series.len() < 2 {
            return Section::unavailable("need at least 2 periods for growth patterns");
        }

        let changes: Vec<f64> = series.total.windows(2).map(|w| w[1] - w[0]).collect();
        let pct_changes: Vec<f64> = series
            .total
            .windows(2)
            .filter(|w| w[0] != 0.0)
            .map(|w| (w[1] - w[0]) / w[0] * 100.0)
            .collect();

        let year_over_year_pct = if series.len() > 4 {
            series
                .total
                .windows(5)
                .filter(|w| w[0] != 0.0)
                .map(|w| (w[4] - w[0]) / w[0] * 100.0)
                .collect()
        } else {
            Vec::new()
        };

        Section::Ok(GrowthPatterns {
            average_change: mean(&changes),
            average_pct_change: if pct_changes.is_empty() {
                0.0
            } else {
                mean(&pct_changes)
            },
            max_increase: changes.iter().copied().fold(f64::MIN, f64::max),
            max_decrease: changes.iter().copied().fold(f64::MAX, f64::min),
            positive_periods: changes.iter().filter(|c| **c > 0.0).count(),
            negative_periods: changes.iter().filter(|c| **c < 0.0).count(),
            year_over_year_pct,
        })
    }

    fn comparative_analysis(&self, series: &LabourSeries) -> Section<ComparativeAnalysis> {
        let min = self.analysis.min_points_comparative;
        if series.len() < min {
            return Section::unavailable(format!(
                "need at least {min} periods for the half-on-half comparison, found {}",
                series.len()
            ));
        }

        let mid = series.len() / 2;
        let first = mean(&series.total[..mid]);
        let second = mean(&series.total[mid..]);

        Section::Ok(ComparativeAnalysis {
            first_half_average: first,
            second_half_average: second,
            improvement_pct: safe_divide(second - first, first, 0.0) * 100.0,
        })
    }

    fn forecasts(&self, series: &LabourSeries) -> Section<Forecast> {
        let min = self.analysis.min_points_forecast;
        if series.len() < min {
            return Section::unavailable(format!(
                "need at least {min} periods to forecast, found {}",
                series.len()
            ));
        }

        // Fit only the most recent window so old regimes do not drag the
        // extrapolation.
        let window = &series.total[series.len() - min..];
        let Some((slope, _)) = fit_line(window) else {
            return Section::unavailable("degenerate recent window");
        };
        let last = series.total[series.len() - 1];

        Section::Ok(Forecast {
            next_period: last + slope,
            following_period: last + 2.0 * slope,
            trend_magnitude: slope.abs(),
            confidence: if slope.abs() < 1000.0 { "low" } else { "medium" },
            methodology: format!("linear extrapolation over the last {min} periods"),
        })
    }

    fn executive_summary(
        &self,
        current: &Section<CurrentIndicators>,
        trends: &Section<HistoricalTrends>,
        gender: &Section<GenderAnalysis>,
    ) -> ExecutiveSummary {
        let mut key_findings = Vec::new();

        if let Some(c) = current.as_ok() {
            key_findings.push(format!(
                "Labour force in {} stands at {} ({})",
                self.region.region_name,
                format_large_number(c.total_labour_force),
                c.period
            ));
            if c.male_participation_pct > c.female_participation_pct {
                key_findings.push(format!(
                    "Male participation ({:.1}%) exceeds female participation ({:.1}%)",
                    c.male_participation_pct, c.female_participation_pct
                ));
            } else {
                key_findings.push(format!(
                    "Female participation ({:.1}%) meets or exceeds male participation ({:.1}%)",
                    c.female_participation_pct, c.male_participation_pct
                ));
            }
        }
        if let Some(t) = trends.as_ok() {
            let g = &t.total.growth;
            if g.total_growth_pct >= 0.0 {
                key_findings.push(format!(
                    "Total labour force grew {:.1}% over {} periods",
                    g.total_growth_pct, g.periods
                ));
            } else {
                key_findings.push(format!(
                    "Total labour force declined {:.1}% over {} periods",
                    g.total_growth_pct.abs(),
                    g.periods
                ));
            }
        }
        if let Some(g) = gender.as_ok() {
            key_findings.push(format!(
                "Fastest-growing segment: {} (+{:.1} pp gap)",
                g.growth_leader, g.growth_gap_pct
            ));
        }

        ExecutiveSummary {
            key_findings,
            recommendations: vec![
                "Monitor quarterly releases for revisions to recent periods".to_string(),
                "Track the gender participation gap against the national series".to_string(),
                "Investigate flagged outlier periods before drawing conclusions".to_string(),
                "Treat forecasts as directional only; the model is a naive linear fit".to_string(),
            ],
        }
    }
}

fn mean_finite(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        0.0
    } else {
        mean(&finite)
    }
}

/// Coefficient of variation in percent over the finite entries.
fn volatility_pct(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() < 2 {
        return 0.0;
    }
    let m = mean(&finite);
    safe_divide(sample_std(&finite), m, 0.0) * 100.0
}

fn series_trend(values: &[f64], outliers_flagged: usize) -> Option<SeriesTrend> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() < 2 {
        return None;
    }
    let growth = calculate_growth_rates(&finite).ok()?;
    let (slope, _) = fit_line(&finite)?;
    let m = mean(&finite);

    let direction = if slope.abs() < 0.01 * m.abs() {
        "stable"
    } else if slope > 0.0 {
        "increasing"
    } else {
        "decreasing"
    };

    let pct_changes: Vec<f64> = finite
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| ((w[1] - w[0]) / w[0]).abs() * 100.0)
        .collect();

    Some(SeriesTrend {
        growth,
        trend_direction: direction,
        coefficient_of_variation_pct: volatility_pct(&finite),
        average_absolute_change_pct: if pct_changes.is_empty() {
            0.0
        } else {
            mean(&pct_changes)
        },
        max_change_pct: pct_changes.iter().copied().fold(0.0, f64::max),
        outliers_flagged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample_rows;

    fn analyzer() -> LabourAnalyzer {
        LabourAnalyzer::new(RegionConfig::default(), AnalysisConfig::default())
    }

    #[test]
    fn full_dataset_fills_every_section() {
        let rows = sample_rows(1, 24);
        let report = analyzer().analyze(&rows);

        assert_eq!(report.metadata.periods_analyzed, 24);
        assert!(report.current_indicators.is_ok());
        assert!(report.historical_trends.is_ok());
        assert!(report.gender_analysis.is_ok());
        assert!(report.seasonal_patterns.is_ok());
        assert!(report.growth_patterns.is_ok());
        assert!(report.comparative_analysis.is_ok());
        assert!(report.forecasts.is_ok());
        assert!(!report.executive_summary.key_findings.is_empty());
        assert_eq!(report.executive_summary.recommendations.len(), 4);
    }

    #[test]
    fn short_dataset_degrades_sections_instead_of_failing() {
        let rows = sample_rows(2, 3);
        let report = analyzer().analyze(&rows);

        assert!(report.current_indicators.is_ok());
        assert!(report.growth_patterns.is_ok());
        // 3 < min_points_seasonal (8) and < min_points_forecast (4).
        assert!(!report.seasonal_patterns.is_ok());
        assert!(!report.forecasts.is_ok());
        match &report.seasonal_patterns {
            Section::Unavailable { error } => assert!(error.contains("8")),
            Section::Ok(_) => unreachable!(),
        }
    }

    #[test]
    fn participation_percentages_sum_to_roughly_one_hundred() {
        let rows = sample_rows(3, 16);
        let report = analyzer().analyze(&rows);
        let c = report.current_indicators.as_ok().unwrap();
        let sum = c.male_participation_pct + c.female_participation_pct;
        assert!((sum - 100.0).abs() < 1.0, "sum = {sum}");
    }

    #[test]
    fn empty_input_yields_an_unavailable_report() {
        let report = analyzer().analyze(&[]);
        assert_eq!(report.metadata.periods_analyzed, 0);
        assert!(!report.current_indicators.is_ok());
        assert!(!report.historical_trends.is_ok());
    }

    #[test]
    fn volatility_changes_are_percentages_of_the_base() {
        // 200 -> 300 is a 50% move, not a 100-unit one.
        let t = series_trend(&[200.0, 300.0], 0).unwrap();
        assert!((t.max_change_pct - 50.0).abs() < 1e-9);
        assert!((t.average_absolute_change_pct - 50.0).abs() < 1e-9);

        // Declines count by magnitude: 100 -> 80 is 20%.
        let t = series_trend(&[100.0, 80.0, 80.0], 0).unwrap();
        assert!((t.max_change_pct - 20.0).abs() < 1e-9);
        assert!((t.average_absolute_change_pct - 10.0).abs() < 1e-9);
    }

    fn two_period_series(male: [f64; 2], female: [f64; 2]) -> LabourSeries {
        LabourSeries {
            period_codes: vec!["2023-V01".into(), "2023-V04".into()],
            dates: vec![None, None],
            quarters: vec![Some(1), Some(2)],
            total: vec![male[0] + female[0], male[1] + female[1]],
            male: male.to_vec(),
            female: female.to_vec(),
            outlier_flags: vec![false, false],
        }
    }

    #[test]
    fn growth_leader_tie_goes_to_the_female_series() {
        let labour = analyzer();

        // Both series grow exactly 10%.
        let series = two_period_series([50.0, 55.0], [100.0, 110.0]);
        let g = labour.gender_analysis(&series);
        let g = g.as_ok().unwrap();
        assert_eq!(g.growth_leader, "female");
        assert!(g.growth_gap_pct.abs() < 1e-9);

        // A strictly faster male series still wins.
        let series = two_period_series([50.0, 60.0], [100.0, 110.0]);
        let g = labour.gender_analysis(&series);
        assert_eq!(g.as_ok().unwrap().growth_leader, "male");
    }
}
