//! Correlation between named series.
//!
//! Pearson and Spearman coefficients on pairwise-complete observations
//! (both entries finite), plus a ranked listing of the strongest pairs with
//! a verbal strength tier.

use serde::Serialize;

use super::descriptive::mean;

#[derive(Debug, Clone, Serialize)]
pub struct CorrelationPair {
    pub first: String,
    pub second: String,
    pub pearson: f64,
    pub spearman: f64,
    /// `"very_weak"` … `"very_strong"`, tiered on `|pearson|`.
    pub strength: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major Pearson matrix over `columns`.
    pub pearson: Vec<Vec<f64>>,
    pub spearman: Vec<Vec<f64>>,
    /// Strongest off-diagonal pairs, descending `|pearson|`, capped at ten.
    pub top_pairs: Vec<CorrelationPair>,
}

/// Verbal tier for an absolute correlation.
pub fn strength_tier(r: f64) -> &'static str {
    let r = r.abs();
    if r < 0.2 {
        "very_weak"
    } else if r < 0.4 {
        "weak"
    } else if r < 0.6 {
        "moderate"
    } else if r < 0.8 {
        "strong"
    } else {
        "very_strong"
    }
}

/// Build the full matrix over `(name, series)` columns.
///
/// Series may have different lengths; each pair is trimmed to the shorter
/// one and filtered to rows where both values are finite. Undefined cells
/// (fewer than two complete pairs, or zero variance) are reported as 0.
pub fn correlation_matrix(columns: &[(String, Vec<f64>)]) -> CorrelationMatrix {
    let k = columns.len();
    let mut pearson = vec![vec![0.0; k]; k];
    let mut spearman = vec![vec![0.0; k]; k];
    let mut pairs = Vec::new();

    for i in 0..k {
        pearson[i][i] = 1.0;
        spearman[i][i] = 1.0;
        for j in (i + 1)..k {
            let (xs, ys) = pairwise_complete(&columns[i].1, &columns[j].1);
            let p = pearson_of(&xs, &ys);
            let s = pearson_of(&ranks(&xs), &ranks(&ys));
            pearson[i][j] = p;
            pearson[j][i] = p;
            spearman[i][j] = s;
            spearman[j][i] = s;
            pairs.push(CorrelationPair {
                first: columns[i].0.clone(),
                second: columns[j].0.clone(),
                pearson: p,
                spearman: s,
                strength: strength_tier(p),
            });
        }
    }

    pairs.sort_by(|a, b| b.pearson.abs().total_cmp(&a.pearson.abs()));
    pairs.truncate(10);

    CorrelationMatrix {
        columns: columns.iter().map(|(n, _)| n.clone()).collect(),
        pearson,
        spearman,
        top_pairs: pairs,
    }
}

fn pairwise_complete(a: &[f64], b: &[f64]) -> (Vec<f64>, Vec<f64>) {
    a.iter()
        .zip(b.iter())
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| (*x, *y))
        .unzip()
}

fn pearson_of(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let mx = mean(xs);
    let my = mean(ys);
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs.iter().zip(ys.iter()) {
        cov += (x - mx) * (y - my);
        vx += (x - mx).powi(2);
        vy += (y - my).powi(2);
    }
    if vx <= 0.0 || vy <= 0.0 {
        return 0.0;
    }
    cov / (vx.sqrt() * vy.sqrt())
}

/// Average ranks (1-based); ties share the mean of their rank positions.
fn ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut out = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && values[order[j]] == values[order[i]] {
            j += 1;
        }
        // Positions i..j hold equal values; all get the average rank.
        let avg = (i + j + 1) as f64 / 2.0;
        for &idx in &order[i..j] {
            out[idx] = avg;
        }
        i = j;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(pairs: &[(&str, &[f64])]) -> Vec<(String, Vec<f64>)> {
        pairs
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_vec()))
            .collect()
    }

    #[test]
    fn perfectly_linear_columns_correlate_at_one() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [10.0, 20.0, 30.0, 40.0, 50.0];
        let m = correlation_matrix(&named(&[("x", &x), ("y", &y)]));

        assert!((m.pearson[0][1] - 1.0).abs() < 1e-12);
        assert!((m.spearman[0][1] - 1.0).abs() < 1e-12);
        assert_eq!(m.top_pairs[0].strength, "very_strong");
    }

    #[test]
    fn monotone_nonlinear_gives_perfect_spearman_only() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [1.0, 8.0, 27.0, 64.0, 125.0];
        let m = correlation_matrix(&named(&[("x", &x), ("y", &y)]));

        assert!((m.spearman[0][1] - 1.0).abs() < 1e-12);
        assert!(m.pearson[0][1] < 1.0);
    }

    #[test]
    fn nan_rows_are_excluded_pairwise() {
        let x = [1.0, f64::NAN, 3.0, 4.0, 5.0];
        let y = [2.0, 100.0, 6.0, 8.0, 10.0];
        let m = correlation_matrix(&named(&[("x", &x), ("y", &y)]));
        assert!((m.pearson[0][1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_column_reports_zero() {
        let x = [5.0, 5.0, 5.0, 5.0];
        let y = [1.0, 2.0, 3.0, 4.0];
        let m = correlation_matrix(&named(&[("x", &x), ("y", &y)]));
        assert_eq!(m.pearson[0][1], 0.0);
    }

    #[test]
    fn tied_ranks_are_averaged() {
        let r = ranks(&[10.0, 20.0, 20.0, 30.0]);
        assert_eq!(r, vec![1.0, 2.5, 2.5, 4.0]);
    }

    #[test]
    fn strength_tiers_cover_the_unit_interval() {
        assert_eq!(strength_tier(0.1), "very_weak");
        assert_eq!(strength_tier(-0.3), "weak");
        assert_eq!(strength_tier(0.5), "moderate");
        assert_eq!(strength_tier(-0.7), "strong");
        assert_eq!(strength_tier(0.95), "very_strong");
    }
}
