//! Least squares solver.
//!
//! The trend and forecast code repeatedly fits small regressions of the form
//! `minimize Σ (y_i - x_i^T β)^2` where the design matrix has 2 columns
//! (intercept and time index). SVD solves these robustly even when the
//! matrix is tall, which `QR::solve` does not handle.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y = intercept + slope * i` over `i = 0..n`.
///
/// Returns `(slope, intercept)`; `None` for fewer than two points or a
/// degenerate system.
pub fn fit_line(y: &[f64]) -> Option<(f64, f64)> {
    if y.len() < 2 {
        return None;
    }
    let n = y.len();
    let mut design = DMatrix::zeros(n, 2);
    for i in 0..n {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = i as f64;
    }
    let rhs = DVector::from_column_slice(y);
    let beta = solve_least_squares(&design, &rhs)?;
    Some((beta[1], beta[0]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn fit_line_recovers_slope_and_intercept() {
        let y = [10.0, 12.5, 15.0, 17.5];
        let (slope, intercept) = fit_line(&y).unwrap();
        assert!((slope - 2.5).abs() < 1e-10);
        assert!((intercept - 10.0).abs() < 1e-10);
    }

    #[test]
    fn fit_line_refuses_single_point() {
        assert!(fit_line(&[1.0]).is_none());
    }
}
