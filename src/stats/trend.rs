//! Trend detection.
//!
//! Two complementary tests run over the same series:
//!
//! - a linear regression on the time index, with a two-sided t-test on the
//!   slope (parametric)
//! - the Mann-Kendall test on pairwise signs (non-parametric, robust to
//!   outliers and non-normality)
//!
//! Both use the 0.05 significance level.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

use super::descriptive::mean;
use super::ols::fit_line;

const ALPHA: f64 = 0.05;

#[derive(Debug, Clone, Serialize)]
pub struct TrendAnalysis {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub p_value: f64,
    /// `"increasing"`, `"decreasing"` or `"no_trend"`, from the slope sign
    /// alone; `significant` reports the t-test verdict separately.
    pub direction: &'static str,
    pub significant: bool,
    pub mann_kendall: MannKendall,
}

#[derive(Debug, Clone, Serialize)]
pub struct MannKendall {
    pub s_statistic: i64,
    pub z_statistic: f64,
    pub p_value: f64,
    /// Sign of z; independent of `significant`.
    pub direction: &'static str,
    pub significant: bool,
}

/// Run both trend tests; `None` for fewer than three finite points.
pub fn trend_analysis(series: &[f64]) -> Option<TrendAnalysis> {
    let values: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();
    if values.len() < 3 {
        return None;
    }

    let (slope, intercept) = fit_line(&values)?;
    let n = values.len();
    let y_mean = mean(&values);

    let ss_tot: f64 = values.iter().map(|v| (v - y_mean).powi(2)).sum();
    let ss_res: f64 = values
        .iter()
        .enumerate()
        .map(|(i, v)| (v - (intercept + slope * i as f64)).powi(2))
        .sum();
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

    // Two-sided t-test on the correlation: t = r * sqrt((n-2) / (1-r²)).
    let r = r_squared.sqrt().copysign(slope);
    let p_value = if (1.0 - r_squared).abs() < f64::EPSILON {
        0.0
    } else {
        let t = r * ((n as f64 - 2.0) / (1.0 - r_squared)).sqrt();
        match StudentsT::new(0.0, 1.0, n as f64 - 2.0) {
            Ok(dist) => 2.0 * (1.0 - dist.cdf(t.abs())),
            Err(_) => 1.0,
        }
    };

    let significant = p_value < ALPHA;
    let direction = if slope > 0.0 {
        "increasing"
    } else if slope < 0.0 {
        "decreasing"
    } else {
        "no_trend"
    };

    Some(TrendAnalysis {
        slope,
        intercept,
        r_squared,
        p_value,
        direction,
        significant,
        mann_kendall: mann_kendall(&values),
    })
}

/// Mann-Kendall test with the normal approximation and the standard
/// continuity correction on S.
fn mann_kendall(values: &[f64]) -> MannKendall {
    let n = values.len();
    let mut s: i64 = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            s += match values[j].partial_cmp(&values[i]) {
                Some(std::cmp::Ordering::Greater) => 1,
                Some(std::cmp::Ordering::Less) => -1,
                _ => 0,
            };
        }
    }

    let nf = n as f64;
    let variance = nf * (nf - 1.0) * (2.0 * nf + 5.0) / 18.0;
    let z = if s > 0 {
        (s as f64 - 1.0) / variance.sqrt()
    } else if s < 0 {
        (s as f64 + 1.0) / variance.sqrt()
    } else {
        0.0
    };

    let p_value = match Normal::new(0.0, 1.0) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(z.abs())),
        Err(_) => 1.0,
    };
    let significant = p_value < ALPHA;
    let direction = if z > 0.0 {
        "increasing"
    } else if z < 0.0 {
        "decreasing"
    } else {
        "no_trend"
    };

    MannKendall {
        s_statistic: s,
        z_statistic: z,
        p_value,
        direction,
        significant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strictly_increasing_series_is_detected() {
        let series: Vec<f64> = (0..20).map(|i| 100.0 + 2.0 * i as f64).collect();
        let t = trend_analysis(&series).unwrap();
        assert!(t.slope > 1.9 && t.slope < 2.1);
        assert!(t.r_squared > 0.999);
        assert_eq!(t.direction, "increasing");
        assert!(t.significant);
        assert_eq!(t.mann_kendall.direction, "increasing");
        assert!(t.mann_kendall.significant);
        // All pairs concordant: S = n(n-1)/2.
        assert_eq!(t.mann_kendall.s_statistic, 190);
    }

    #[test]
    fn decreasing_series_flips_the_sign() {
        let series: Vec<f64> = (0..20).map(|i| 500.0 - 3.0 * i as f64).collect();
        let t = trend_analysis(&series).unwrap();
        assert_eq!(t.direction, "decreasing");
        assert_eq!(t.mann_kendall.direction, "decreasing");
        assert_eq!(t.mann_kendall.s_statistic, -190);
    }

    #[test]
    fn alternating_series_is_not_significant() {
        let series: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        let t = trend_analysis(&series).unwrap();
        assert!(!t.mann_kendall.significant);
    }

    #[test]
    fn weak_drift_reports_direction_without_significance() {
        // z = (S-1)/sqrt(var) with S = 5 over n = 5: positive but far from
        // the 0.05 cutoff. The direction still follows the sign of z.
        let t = trend_analysis(&[1.0, 3.0, 2.0, 4.0, 3.0]).unwrap();
        let mk = &t.mann_kendall;
        assert_eq!(mk.s_statistic, 5);
        assert!(mk.z_statistic > 0.0);
        assert_eq!(mk.direction, "increasing");
        assert!(!mk.significant);
        assert!(mk.p_value > 0.05);

        // Same separation on the regression side: positive slope, weak fit.
        assert!(t.slope > 0.0);
        assert_eq!(t.direction, "increasing");
    }

    #[test]
    fn constant_series_has_no_direction() {
        let t = trend_analysis(&[7.0, 7.0, 7.0, 7.0, 7.0]).unwrap();
        assert_eq!(t.mann_kendall.s_statistic, 0);
        assert_eq!(t.mann_kendall.z_statistic, 0.0);
        assert_eq!(t.mann_kendall.direction, "no_trend");
        assert!(!t.significant);
    }

    #[test]
    fn too_short_series_yields_none() {
        assert!(trend_analysis(&[1.0, 2.0]).is_none());
        assert!(trend_analysis(&[]).is_none());
    }
}
