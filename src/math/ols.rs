//! Least squares solver for the cross-asset regression.
//!
//! The regression here is tiny (two columns: intercept + one price series),
//! but the design matrix is tall, so we solve via SVD rather than QR
//! (nalgebra's `QR::solve` is intended for square systems). SVD also degrades
//! gracefully when the columns are nearly collinear, which happens with
//! near-constant price history.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if the strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y = intercept + slope * x`, returning `(slope, intercept)`.
pub fn fit_line(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len();
    let mut design = DMatrix::zeros(n, 2);
    for (i, &xi) in x.iter().enumerate() {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = xi;
    }
    let rhs = DVector::from_row_slice(y);

    let beta = solve_least_squares(&design, &rhs)?;
    Some((beta[1], beta[0]))
}
