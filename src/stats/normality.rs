//! Normality tests.
//!
//! Three classical tests against a fitted normal, each with a 0.05 verdict:
//!
//! - Shapiro-Wilk via the Royston AS R94 approximation (3 ≤ n ≤ 5000)
//! - Kolmogorov-Smirnov with the asymptotic distribution of the statistic
//! - Anderson-Darling with the small-sample corrected statistic against
//!   tabulated critical values

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

use super::descriptive::{mean, sample_std};

const ALPHA: f64 = 0.05;

#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub statistic: f64,
    pub p_value: f64,
    pub is_normal: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AndersonDarling {
    /// Small-sample corrected A² statistic.
    pub statistic: f64,
    /// Critical values at the 15, 10, 5, 2.5 and 1 percent levels.
    pub critical_values: [f64; 5],
    pub is_normal: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NormalityReport {
    pub shapiro_wilk: Option<TestResult>,
    pub kolmogorov_smirnov: Option<TestResult>,
    pub anderson_darling: Option<AndersonDarling>,
    /// True when every applicable test accepted normality.
    pub is_normal: bool,
}

/// Run all three tests; individual tests degrade to `None` outside their
/// sample-size range or on a degenerate series.
pub fn normality_tests(series: &[f64]) -> Option<NormalityReport> {
    let mut values: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();
    if values.len() < 3 {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));

    let shapiro_wilk = shapiro_wilk(&values);
    let kolmogorov_smirnov = kolmogorov_smirnov(&values);
    let anderson_darling = anderson_darling(&values);

    let mut verdicts = Vec::new();
    if let Some(t) = &shapiro_wilk {
        verdicts.push(t.is_normal);
    }
    if let Some(t) = &kolmogorov_smirnov {
        verdicts.push(t.is_normal);
    }
    if let Some(t) = &anderson_darling {
        verdicts.push(t.is_normal);
    }

    Some(NormalityReport {
        shapiro_wilk,
        kolmogorov_smirnov,
        anderson_darling,
        is_normal: !verdicts.is_empty() && verdicts.iter().all(|v| *v),
    })
}

/// Shapiro-Wilk W with Royston's polynomial approximations for the weights
/// and the p-value. Input must be sorted ascending.
fn shapiro_wilk(sorted: &[f64]) -> Option<TestResult> {
    let n = sorted.len();
    if !(3..=5000).contains(&n) {
        return None;
    }
    let std_normal = Normal::new(0.0, 1.0).ok()?;

    let x_mean = mean(sorted);
    let ss: f64 = sorted.iter().map(|v| (v - x_mean).powi(2)).sum();
    if ss <= 0.0 {
        return None;
    }

    // n = 3 has exact weights and an exact p-value.
    if n == 3 {
        let b = std::f64::consts::FRAC_1_SQRT_2 * (sorted[2] - sorted[0]);
        let w = (b * b / ss).clamp(0.0, 1.0);
        let p = 6.0 / std::f64::consts::PI * (w.sqrt().asin() - (0.75f64).sqrt().asin());
        let p_value = p.clamp(0.0, 1.0);
        return Some(TestResult {
            statistic: w,
            p_value,
            is_normal: p_value > ALPHA,
        });
    }

    // Expected normal order statistics via the Blom approximation.
    let m: Vec<f64> = (1..=n)
        .map(|i| std_normal.inverse_cdf((i as f64 - 0.375) / (n as f64 + 0.25)))
        .collect();
    let m_norm_sq: f64 = m.iter().map(|v| v * v).sum();
    let c: Vec<f64> = m.iter().map(|v| v / m_norm_sq.sqrt()).collect();

    let u = 1.0 / (n as f64).sqrt();
    let mut a = c.clone();
    let a_n = c[n - 1] + 0.221157 * u - 0.147981 * u.powi(2) - 2.071190 * u.powi(3)
        + 4.434685 * u.powi(4)
        - 2.706056 * u.powi(5);
    a[n - 1] = a_n;
    a[0] = -a_n;

    let phi;
    if n > 5 {
        let a_n1 = c[n - 2] + 0.042981 * u - 0.293762 * u.powi(2) - 1.752461 * u.powi(3)
            + 5.682633 * u.powi(4)
            - 3.582633 * u.powi(5);
        a[n - 2] = a_n1;
        a[1] = -a_n1;
        phi = (m_norm_sq - 2.0 * m[n - 1].powi(2) - 2.0 * m[n - 2].powi(2))
            / (1.0 - 2.0 * a_n.powi(2) - 2.0 * a_n1.powi(2));
    } else {
        phi = (m_norm_sq - 2.0 * m[n - 1].powi(2)) / (1.0 - 2.0 * a_n.powi(2));
    }
    if phi <= 0.0 {
        return None;
    }
    let scale = phi.sqrt();
    let edge = if n > 5 { 2 } else { 1 };
    for i in edge..(n - edge) {
        a[i] = m[i] / scale;
    }

    let b: f64 = a.iter().zip(sorted.iter()).map(|(ai, xi)| ai * xi).sum();
    let w = (b * b / ss).clamp(0.0, 1.0);

    let nf = n as f64;
    let p_value = if n <= 11 {
        let gamma = -2.273 + 0.459 * nf;
        let mu = 0.5440 - 0.39978 * nf + 0.025054 * nf * nf - 0.0006714 * nf.powi(3);
        let sigma = (1.3822 - 0.77857 * nf + 0.062767 * nf * nf - 0.0020322 * nf.powi(3)).exp();
        let arg = gamma - (1.0 - w).ln();
        if arg <= 0.0 {
            return None;
        }
        let z = (-arg.ln() - mu) / sigma;
        1.0 - std_normal.cdf(z)
    } else {
        let l = nf.ln();
        let mu = -1.5861 - 0.31082 * l - 0.083751 * l * l + 0.0038915 * l.powi(3);
        let sigma = (-0.4803 - 0.082676 * l + 0.0030302 * l * l).exp();
        let z = ((1.0 - w).ln() - mu) / sigma;
        1.0 - std_normal.cdf(z)
    };

    Some(TestResult {
        statistic: w,
        p_value,
        is_normal: p_value > ALPHA,
    })
}

/// One-sample KS test against the normal fitted by sample mean and std.
/// Input sorted ascending.
fn kolmogorov_smirnov(sorted: &[f64]) -> Option<TestResult> {
    let n = sorted.len();
    let mu = mean(sorted);
    let sigma = sample_std(sorted);
    if sigma <= 0.0 {
        return None;
    }
    let dist = Normal::new(mu, sigma).ok()?;

    let nf = n as f64;
    let mut d: f64 = 0.0;
    for (i, x) in sorted.iter().enumerate() {
        let cdf = dist.cdf(*x);
        let above = ((i + 1) as f64 / nf - cdf).abs();
        let below = (cdf - i as f64 / nf).abs();
        d = d.max(above).max(below);
    }

    // Asymptotic Kolmogorov distribution with the small-sample adjustment.
    let lambda = (nf.sqrt() + 0.12 + 0.11 / nf.sqrt()) * d;
    let mut p: f64 = 0.0;
    for k in 1..=100 {
        let kf = k as f64;
        let term = (-2.0 * kf * kf * lambda * lambda).exp();
        p += if k % 2 == 1 { 2.0 * term } else { -2.0 * term };
    }
    let p_value = p.clamp(0.0, 1.0);

    Some(TestResult {
        statistic: d,
        p_value,
        is_normal: p_value > ALPHA,
    })
}

/// Anderson-Darling critical values for the normal case (D'Agostino &
/// Stephens), at 15 / 10 / 5 / 2.5 / 1 percent.
const AD_CRITICAL: [f64; 5] = [0.576, 0.656, 0.787, 0.918, 1.092];

fn anderson_darling(sorted: &[f64]) -> Option<AndersonDarling> {
    let n = sorted.len();
    let mu = mean(sorted);
    let sigma = sample_std(sorted);
    if sigma <= 0.0 {
        return None;
    }
    let dist = Normal::new(mu, sigma).ok()?;
    let nf = n as f64;

    let mut sum = 0.0;
    for i in 0..n {
        let f_lo = dist.cdf(sorted[i]).clamp(1e-12, 1.0 - 1e-12);
        let f_hi = dist.cdf(sorted[n - 1 - i]).clamp(1e-12, 1.0 - 1e-12);
        sum += (2.0 * (i + 1) as f64 - 1.0) * (f_lo.ln() + (1.0 - f_hi).ln());
    }
    let a_sq = -nf - sum / nf;
    let corrected = a_sq * (1.0 + 0.75 / nf + 2.25 / (nf * nf));

    Some(AndersonDarling {
        statistic: corrected,
        critical_values: AD_CRITICAL,
        // 5 percent level.
        is_normal: corrected < AD_CRITICAL[2],
    })
}
