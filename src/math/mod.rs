//! Numeric helpers: rounding, least squares, correlation/regression.

pub mod ols;
pub mod stats;

/// Round to `dp` decimal places, half away from zero.
///
/// All user-facing monetary and percentage figures go through this so the
/// report matches what a spreadsheet user would compute by hand.
pub fn round_dp(v: f64, dp: u32) -> f64 {
    let scale = 10f64.powi(dp as i32);
    (v * scale).round() / scale
}
