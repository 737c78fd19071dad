//! Change-point detection.
//!
//! A scan over every admissible split index: each split is scored with a
//! pooled two-sample t-test between the left and right segments, and splits
//! with p below a strict 0.01 are reported. Candidate splits are scored in
//! parallel since each one is independent.

use rayon::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

#[derive(Debug, Clone, Serialize)]
pub struct ChangePoint {
    /// Index of the first point of the right segment.
    pub index: usize,
    pub mean_before: f64,
    pub mean_after: f64,
    pub t_statistic: f64,
    pub p_value: f64,
}

const ALPHA: f64 = 0.01;

/// Scan for mean shifts. `min_segment` is the smallest segment length on
/// either side of a split; series shorter than `2 * min_segment` return no
/// change points.
pub fn detect_change_points(series: &[f64], min_segment: usize) -> Vec<ChangePoint> {
    let values: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();
    let n = values.len();
    let min_segment = min_segment.max(2);
    if n < 2 * min_segment {
        return Vec::new();
    }

    let mut points: Vec<ChangePoint> = (min_segment..=n - min_segment)
        .into_par_iter()
        .filter_map(|split| score_split(&values, split))
        .filter(|cp| cp.p_value < ALPHA)
        .collect();
    points.sort_by_key(|cp| cp.index);
    points
}

fn score_split(values: &[f64], split: usize) -> Option<ChangePoint> {
    let (left, right) = values.split_at(split);
    let (n1, n2) = (left.len() as f64, right.len() as f64);

    let mean1 = left.iter().sum::<f64>() / n1;
    let mean2 = right.iter().sum::<f64>() / n2;
    let var1 = left.iter().map(|v| (v - mean1).powi(2)).sum::<f64>() / (n1 - 1.0);
    let var2 = right.iter().map(|v| (v - mean2).powi(2)).sum::<f64>() / (n2 - 1.0);

    let df = n1 + n2 - 2.0;
    let pooled = (((n1 - 1.0) * var1 + (n2 - 1.0) * var2) / df).sqrt();
    let se = pooled * (1.0 / n1 + 1.0 / n2).sqrt();
    if se <= 0.0 {
        return None;
    }

    let t = (mean1 - mean2) / se;
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    let p_value = 2.0 * (1.0 - dist.cdf(t.abs()));

    Some(ChangePoint {
        index: split,
        mean_before: mean1,
        mean_after: mean2,
        t_statistic: t,
        p_value,
    })
}
