//! Inflation-aware return formulas.
//!
//! All pure functions over scalars plus the explicit `InflationWindow`. The
//! sentinel window collapses every real-ROI figure back to its nominal
//! counterpart; the presentation layer is responsible for saying so instead
//! of printing a misleadingly exact "0% inflation".

use crate::domain::InflationWindow;
use crate::math::round_dp;

/// Percent change of the index over the window, rounded 1dp.
///
/// Computed only when both CPI values are strictly positive; the sentinel
/// (and any degenerate pair) yields 0.
pub fn inflation_rate_pct(window: &InflationWindow) -> f64 {
    if window.is_disabled() {
        return 0.0;
    }
    round_dp(
        (window.cpi_end - window.cpi_start) / window.cpi_start * 100.0,
        1,
    )
}

/// Real ROI via the Fisher equation, as a percent, rounded 2dp.
///
/// `(1 + real) = (1 + nominal) / (1 + inflation)`; with zero inflation this
/// degenerates to the nominal ROI.
pub fn real_roi_pct(nominal_roi_pct: f64, inflation_rate_pct: f64) -> f64 {
    let fisher = (1.0 + nominal_roi_pct / 100.0) / (1.0 + inflation_rate_pct / 100.0) - 1.0;
    round_dp(fisher * 100.0, 2)
}

/// Ending value expressed in start-of-window purchasing power, rounded 2dp.
pub fn usd_return_inflation_adjusted(total_usd_invested: f64, real_roi_pct: f64) -> f64 {
    round_dp(total_usd_invested * (1.0 + real_roi_pct / 100.0), 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inflation_rate_from_cpi_pair() {
        // 247.867 -> 299.170 is a 20.7% rise.
        let window = InflationWindow::new(247.867, 299.170);
        assert_eq!(inflation_rate_pct(&window), 20.7);
    }

    #[test]
    fn sentinel_window_means_zero_inflation() {
        assert_eq!(inflation_rate_pct(&InflationWindow::disabled()), 0.0);
        assert_eq!(inflation_rate_pct(&InflationWindow::new(0.0, 299.0)), 0.0);
        assert_eq!(inflation_rate_pct(&InflationWindow::new(f64::NAN, 299.0)), 0.0);
    }

    #[test]
    fn fisher_equation_known_value() {
        // nominal 50%, inflation 10% -> ((1.5/1.1)-1)*100 = 36.36.
        assert_eq!(real_roi_pct(50.0, 10.0), 36.36);
    }

    #[test]
    fn zero_inflation_degenerates_to_nominal() {
        assert_eq!(real_roi_pct(50.0, 0.0), 50.0);
        assert_eq!(real_roi_pct(-12.34, 0.0), -12.34);
    }

    #[test]
    fn sentinel_path_never_divides_by_zero() {
        let window = InflationWindow::new(0.0, 0.0);
        let rate = inflation_rate_pct(&window);
        let real = real_roi_pct(42.0, rate);
        assert_eq!(real, 42.0);
        assert!(real.is_finite());
    }

    #[test]
    fn inflation_adjusted_usd() {
        assert_eq!(usd_return_inflation_adjusted(1000.0, 36.36), 1363.6);
        assert_eq!(usd_return_inflation_adjusted(1000.0, 0.0), 1000.0);
    }
}
