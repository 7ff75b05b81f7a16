//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - asset A portfolio value: `x`
//! - asset B portfolio value: `o`
//! - both in one cell: `*`

use crate::sim::dca::DcaSimulation;

/// Render both portfolio-value trajectories on one grid.
///
/// `ma_weeks > 1` smooths each trajectory with a trailing moving average
/// before drawing (partial windows at the start average whatever is
/// available, so the line starts at week one).
pub fn render_comparison_chart(
    sim_a: &DcaSimulation,
    sim_b: &DcaSimulation,
    ma_weeks: usize,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let values_a = moving_average(&portfolio_values(sim_a), ma_weeks);
    let values_b = moving_average(&portfolio_values(sim_b), ma_weeks);

    let n = values_a.len().max(values_b.len());
    let (v_min, v_max) = value_range(&values_a, &values_b).unwrap_or((0.0, 1.0));
    let (v_min, v_max) = pad_range(v_min, v_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    draw_series(&mut grid, &values_a, n, v_min, v_max, 'x');
    for (i, &v) in values_b.iter().enumerate() {
        let col = map_x(i, n, width);
        let row = map_y(v, v_min, v_max, height);
        grid[row][col] = if grid[row][col] == 'x' { '*' } else { 'o' };
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Chart: {} (x) vs {} (o) | weeks={} | value=[${:.0}, ${:.0}]",
        sim_a.asset.to_uppercase(),
        sim_b.asset.to_uppercase(),
        n,
        v_min,
        v_max
    ));
    if ma_weeks > 1 {
        out.push_str(&format!(" | {ma_weeks}-wk MA"));
    }
    out.push('\n');

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

/// Trailing moving average with partial leading windows.
///
/// `window <= 1` returns the input unchanged.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 {
        return values.to_vec();
    }

    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        let lo = (i + 1).saturating_sub(window);
        let slice = &values[lo..=i];
        out.push(slice.iter().sum::<f64>() / slice.len() as f64);
    }
    out
}

fn portfolio_values(sim: &DcaSimulation) -> Vec<f64> {
    sim.rows.iter().map(|r| r.portfolio_value).collect()
}

fn draw_series(grid: &mut [Vec<char>], values: &[f64], n: usize, v_min: f64, v_max: f64, ch: char) {
    let width = grid.first().map(|r| r.len()).unwrap_or(0);
    let height = grid.len();
    for (i, &v) in values.iter().enumerate() {
        let col = map_x(i, n, width);
        let row = map_y(v, v_min, v_max, height);
        grid[row][col] = ch;
    }
}

fn value_range(a: &[f64], b: &[f64]) -> Option<(f64, f64)> {
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for &v in a.iter().chain(b.iter()) {
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }
    if min_v.is_finite() && max_v.is_finite() {
        Some((min_v, max_v))
    } else {
        None
    }
}

fn pad_range(min_v: f64, max_v: f64, frac: f64) -> (f64, f64) {
    let span = (max_v - min_v).abs().max(1e-9);
    (min_v - span * frac, max_v + span * frac)
}

fn map_x(i: usize, n: usize, width: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let u = i as f64 / (n as f64 - 1.0);
    ((u * (width as f64 - 1.0)).round() as usize).min(width - 1)
}

fn map_y(v: f64, v_min: f64, v_max: f64, height: usize) -> usize {
    let u = ((v - v_min) / (v_max - v_min)).clamp(0.0, 1.0);
    // Row 0 is the top of the grid.
    let row = ((1.0 - u) * (height as f64 - 1.0)).round() as usize;
    row.min(height - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SimulationRow;
    use chrono::{Days, NaiveDate};

    fn sim(asset: &str, values: &[f64]) -> DcaSimulation {
        let start = NaiveDate::from_ymd_opt(2020, 1, 6).unwrap();
        DcaSimulation {
            asset: asset.to_string(),
            weekly_investment: 50.0,
            rows: values
                .iter()
                .enumerate()
                .map(|(i, &v)| SimulationRow {
                    week_ending: start + Days::new(7 * i as u64),
                    purchase_qty: 1.0,
                    cumulative_qty: (i + 1) as f64,
                    portfolio_value: v,
                })
                .collect(),
        }
    }

    #[test]
    fn moving_average_partial_leading_windows() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let ma = moving_average(&values, 3);
        assert_eq!(ma, vec![1.0, 1.5, 2.0, 3.0]);
    }

    #[test]
    fn moving_average_window_one_is_identity() {
        let values = [5.0, 6.0, 7.0];
        assert_eq!(moving_average(&values, 0), values.to_vec());
        assert_eq!(moving_average(&values, 1), values.to_vec());
    }

    #[test]
    fn chart_has_header_and_full_grid() {
        let a = sim("btc", &[10.0, 20.0, 30.0, 40.0]);
        let b = sim("gold", &[40.0, 30.0, 20.0, 10.0]);

        let chart = render_comparison_chart(&a, &b, 0, 40, 10);
        let lines: Vec<&str> = chart.lines().collect();

        assert_eq!(lines.len(), 11); // 1 header + 10 rows
        assert!(lines[0].starts_with("Chart: BTC (x) vs GOLD (o)"));
        assert!(chart.contains('x'));
        assert!(chart.contains('o'));
    }

    #[test]
    fn overlapping_cells_use_star() {
        let a = sim("btc", &[10.0, 20.0]);
        let b = sim("gold", &[10.0, 20.0]);

        let chart = render_comparison_chart(&a, &b, 0, 20, 8);
        let grid: String = chart.lines().skip(1).collect();
        assert!(grid.contains('*'));
        assert!(!grid.contains('x'));
    }

    #[test]
    fn ma_note_only_when_smoothing() {
        let a = sim("btc", &[10.0, 20.0, 30.0]);
        let b = sim("gold", &[30.0, 20.0, 10.0]);

        assert!(!render_comparison_chart(&a, &b, 1, 20, 8).contains("MA"));
        assert!(render_comparison_chart(&a, &b, 4, 20, 8).contains("4-wk MA"));
    }
}
