//! Descriptive statistics.
//!
//! Conventions match the reference tooling the survey analysts already use:
//! sample variance with `ddof = 1`, biased moment skewness and excess
//! kurtosis, linear-interpolation quantiles, and mode resolved to the
//! smallest value on frequency ties.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub mode: f64,
    pub std: f64,
    pub variance: f64,
    pub skewness: f64,
    pub kurtosis: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
}

/// Linear-interpolation quantile over an already sorted slice.
///
/// `q` in `[0, 1]`. The slice must be non-empty and sorted ascending.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}

/// Mean of a non-empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (`ddof = 1`); zero for fewer than two points.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Compute the full descriptive block over a series.
///
/// Non-finite entries are dropped first; `None` when nothing remains.
pub fn descriptive(series: &[f64]) -> Option<DescriptiveStats> {
    let mut values: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let count = values.len();
    let mean_v = mean(&values);
    let variance = if count > 1 {
        values.iter().map(|v| (v - mean_v).powi(2)).sum::<f64>() / (count - 1) as f64
    } else {
        0.0
    };
    let std = variance.sqrt();

    // Biased central-moment skewness and excess kurtosis. On a constant
    // series both are defined as zero rather than NaN.
    let m2 = values.iter().map(|v| (v - mean_v).powi(2)).sum::<f64>() / count as f64;
    let (skewness, kurtosis) = if m2 > 0.0 {
        let m3 = values.iter().map(|v| (v - mean_v).powi(3)).sum::<f64>() / count as f64;
        let m4 = values.iter().map(|v| (v - mean_v).powi(4)).sum::<f64>() / count as f64;
        (m3 / m2.powf(1.5), m4 / (m2 * m2) - 3.0)
    } else {
        (0.0, 0.0)
    };

    let q1 = quantile(&values, 0.25);
    let q3 = quantile(&values, 0.75);
    let min = values[0];
    let max = values[count - 1];

    Some(DescriptiveStats {
        count,
        mean: mean_v,
        median: quantile(&values, 0.5),
        mode: mode_of_sorted(&values),
        std,
        variance,
        skewness,
        kurtosis,
        min,
        max,
        range: max - min,
        q1,
        q3,
        iqr: q3 - q1,
    })
}

/// Most frequent value; smallest value wins frequency ties. Input sorted.
fn mode_of_sorted(values: &[f64]) -> f64 {
    let mut best = values[0];
    let mut best_count = 0usize;
    let mut i = 0;
    while i < values.len() {
        let mut j = i + 1;
        while j < values.len() && values[j] == values[i] {
            j += 1;
        }
        if j - i > best_count {
            best_count = j - i;
            best = values[i];
        }
        i = j;
    }
    best
}
