//! Correlation and cross-asset regression over the aligned weekly table.

use crate::domain::AlignedWeeklyTable;
use crate::error::{AppError, ErrorKind};
use crate::math::ols::fit_line;
use crate::math::round_dp;

/// Pearson correlation plus the comparative-magnitude slope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossStats {
    /// Pearson correlation of the two weekly price columns, rounded 2dp.
    pub correlation: f64,
    /// Larger-magnitude of the two directional regression slopes, truncated
    /// to an integer: "for every $1 the weaker asset moves, the stronger one
    /// moves ~k$", regardless of which side was the regressor.
    pub slope_magnitude: i64,
}

/// Compute correlation and the directional-regression magnitude.
///
/// Weeks where either price is missing are skipped (pairwise deletion, the
/// same convention spreadsheet correlation uses over sparse columns).
pub fn cross_stats(table: &AlignedWeeklyTable) -> Result<CrossStats, AppError> {
    let mut a = Vec::with_capacity(table.rows.len());
    let mut b = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        if let (Some(pa), Some(pb)) = (row.close_a, row.close_b) {
            a.push(pa);
            b.push(pb);
        }
    }

    if a.len() < 3 {
        return Err(degenerate_input(
            "fewer than 3 weeks with prices for both assets",
        ));
    }

    let correlation = pearson(&a, &b).ok_or_else(|| {
        degenerate_input("one of the price columns is constant over the window")
    })?;

    // Both directions: a on b, and b on a.
    let (slope_a_on_b, _) =
        fit_line(&b, &a).ok_or_else(|| degenerate_input("regression solve did not converge"))?;
    let (slope_b_on_a, _) =
        fit_line(&a, &b).ok_or_else(|| degenerate_input("regression solve did not converge"))?;

    if !(slope_a_on_b.is_finite() && slope_b_on_a.is_finite()) {
        return Err(degenerate_input("regression produced non-finite slopes"));
    }

    let winner = if slope_a_on_b.abs() >= slope_b_on_a.abs() {
        slope_a_on_b
    } else {
        slope_b_on_a
    };

    Ok(CrossStats {
        correlation: round_dp(correlation, 2),
        slope_magnitude: winner.trunc() as i64,
    })
}

/// Pearson correlation. `None` when either column has (near-)zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom < f64::EPSILON {
        return None;
    }

    let r = cov / denom;
    if r.is_finite() { Some(r) } else { None }
}

fn degenerate_input(detail: &str) -> AppError {
    AppError::new(
        ErrorKind::NumericInstability,
        format!(
            "cannot compute correlation/regression: {detail}. \
             Try `--join inner` to drop sparse rows, or a more recent (narrower) date window."
        ),
    )
}
