//! The demographics analyzer.
//!
//! A narrower companion to the labour analyzer: gender distribution,
//! temporal evolution with a convergence verdict, participation rates and
//! the overall direction of each demographic series.

use serde::Serialize;

use crate::config::{AnalysisConfig, RegionConfig};
use crate::domain::AnalysisRow;
use crate::stats::descriptive::mean;

use super::{calculate_growth_rates, safe_divide, LabourSeries, Section};

#[derive(Debug, Clone, Serialize)]
pub struct GenderDistribution {
    pub male_total: f64,
    pub female_total: f64,
    pub male_pct: f64,
    pub female_pct: f64,
    /// Males per hundred females.
    pub gender_ratio: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemporalEvolution {
    pub male_growth_pct: f64,
    pub female_growth_pct: f64,
    /// Participation gap (male share minus female share) at the first and
    /// last period, in percentage points.
    pub initial_gap_pp: f64,
    pub final_gap_pp: f64,
    /// `"converging"` when the gap narrowed, `"diverging"` otherwise.
    pub gap_direction: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipationRates {
    pub current_female_pct: f64,
    pub current_male_pct: f64,
    pub historical_female_pct: f64,
    pub historical_male_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DemographicTrends {
    pub male_direction: &'static str,
    pub female_direction: &'static str,
    pub total_direction: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct DemographicsAnalysis {
    pub region_name: String,
    pub gender_distribution: Section<GenderDistribution>,
    pub temporal_evolution: Section<TemporalEvolution>,
    pub participation_rates: Section<ParticipationRates>,
    pub demographic_trends: Section<DemographicTrends>,
}

pub struct DemographicsAnalyzer {
    region: RegionConfig,
    analysis: AnalysisConfig,
}

impl DemographicsAnalyzer {
    pub fn new(region: RegionConfig, analysis: AnalysisConfig) -> Self {
        Self { region, analysis }
    }

    pub fn analyze(&self, rows: &[AnalysisRow]) -> DemographicsAnalysis {
        let series = LabourSeries::from_rows(rows);
        log::info!("demographics analysis over {} periods", series.len());

        DemographicsAnalysis {
            region_name: self.region.region_name.clone(),
            gender_distribution: gender_distribution(&series),
            temporal_evolution: self.temporal_evolution(&series),
            participation_rates: participation_rates(&series),
            demographic_trends: self.demographic_trends(&series),
        }
    }

    fn temporal_evolution(&self, series: &LabourSeries) -> Section<TemporalEvolution> {
        if series.len() < self.analysis.min_points_trend {
            return Section::unavailable(format!(
                "need at least {} periods, found {}",
                self.analysis.min_points_trend,
                series.len()
            ));
        }
        let (male_growth, female_growth) = match (
            calculate_growth_rates(&series.male),
            calculate_growth_rates(&series.female),
        ) {
            (Ok(m), Ok(f)) => (m, f),
            _ => return Section::unavailable("gender series too sparse for growth rates"),
        };

        let gap_at = |i: usize| -> Option<f64> {
            let (t, m, f) = (series.total[i], series.male[i], series.female[i]);
            if t > 0.0 && m.is_finite() && f.is_finite() {
                Some((m - f) / t * 100.0)
            } else {
                None
            }
        };
        let (Some(initial_gap), Some(final_gap)) = (gap_at(0), gap_at(series.len() - 1)) else {
            return Section::unavailable("endpoint periods lack complete gender data");
        };

        Section::Ok(TemporalEvolution {
            male_growth_pct: male_growth.total_growth_pct,
            female_growth_pct: female_growth.total_growth_pct,
            initial_gap_pp: initial_gap,
            final_gap_pp: final_gap,
            gap_direction: if final_gap.abs() < initial_gap.abs() {
                "converging"
            } else {
                "diverging"
            },
        })
    }

    fn demographic_trends(&self, series: &LabourSeries) -> Section<DemographicTrends> {
        if series.len() < 2 {
            return Section::unavailable("need at least 2 periods for direction");
        }
        Section::Ok(DemographicTrends {
            male_direction: endpoint_direction(&series.male),
            female_direction: endpoint_direction(&series.female),
            total_direction: endpoint_direction(&series.total),
        })
    }
}

fn gender_distribution(series: &LabourSeries) -> Section<GenderDistribution> {
    let male_total: f64 = series.male.iter().filter(|v| v.is_finite()).sum();
    let female_total: f64 = series.female.iter().filter(|v| v.is_finite()).sum();
    if male_total <= 0.0 && female_total <= 0.0 {
        return Section::unavailable("no gender-level observations");
    }
    let combined = male_total + female_total;

    Section::Ok(GenderDistribution {
        male_total,
        female_total,
        male_pct: safe_divide(male_total, combined, 0.0) * 100.0,
        female_pct: safe_divide(female_total, combined, 0.0) * 100.0,
        gender_ratio: safe_divide(male_total, female_total, 0.0) * 100.0,
    })
}

fn participation_rates(series: &LabourSeries) -> Section<ParticipationRates> {
    if series.is_empty() {
        return Section::unavailable("no periods with a total observation");
    }
    let share = |num: f64, total: f64| safe_divide(num, total, 0.0) * 100.0;

    let i = series.len() - 1;
    let shares: Vec<(f64, f64)> = (0..series.len())
        .filter(|&j| {
            series.total[j] > 0.0 && series.male[j].is_finite() && series.female[j].is_finite()
        })
        .map(|j| {
            (
                share(series.female[j], series.total[j]),
                share(series.male[j], series.total[j]),
            )
        })
        .collect();
    if shares.is_empty() {
        return Section::unavailable("no complete gender observations");
    }
    let female_hist: Vec<f64> = shares.iter().map(|(f, _)| *f).collect();
    let male_hist: Vec<f64> = shares.iter().map(|(_, m)| *m).collect();

    Section::Ok(ParticipationRates {
        current_female_pct: share(series.female[i], series.total[i]),
        current_male_pct: share(series.male[i], series.total[i]),
        historical_female_pct: mean(&female_hist),
        historical_male_pct: mean(&male_hist),
    })
}

/// Direction from first to last finite value.
fn endpoint_direction(values: &[f64]) -> &'static str {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    match finite.first().zip(finite.last()) {
        Some((first, last)) if last > first => "increasing",
        Some((first, last)) if last < first => "decreasing",
        Some(_) => "stable",
        None => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample_rows;

    fn analyzer() -> DemographicsAnalyzer {
        DemographicsAnalyzer::new(RegionConfig::default(), AnalysisConfig::default())
    }

    #[test]
    fn full_dataset_fills_every_section() {
        let report = analyzer().analyze(&sample_rows(9, 16));
        assert!(report.gender_distribution.is_ok());
        assert!(report.temporal_evolution.is_ok());
        assert!(report.participation_rates.is_ok());
        assert!(report.demographic_trends.is_ok());
    }

    #[test]
    fn distribution_percentages_sum_to_one_hundred() {
        let report = analyzer().analyze(&sample_rows(10, 12));
        let d = report.gender_distribution.as_ok().unwrap();
        assert!((d.male_pct + d.female_pct - 100.0).abs() < 1e-9);
        assert!(d.gender_ratio > 0.0);
    }

    #[test]
    fn empty_input_degrades_every_section() {
        let report = analyzer().analyze(&[]);
        assert!(!report.gender_distribution.is_ok());
        assert!(!report.temporal_evolution.is_ok());
        assert!(!report.participation_rates.is_ok());
        assert!(!report.demographic_trends.is_ok());
    }

    #[test]
    fn endpoint_direction_classifies() {
        assert_eq!(endpoint_direction(&[1.0, 5.0]), "increasing");
        assert_eq!(endpoint_direction(&[5.0, 1.0]), "decreasing");
        assert_eq!(endpoint_direction(&[2.0, 2.0]), "stable");
        assert_eq!(endpoint_direction(&[]), "unknown");
    }
}
