//! Terminal report formatting.
//!
//! Two presentation modes, chosen by the inflation sentinel:
//! - full mode: nominal + real ROI plus the purchasing-power translation
//! - nominal-only mode: no real-ROI lines at all (never a fake "0% inflation")

use crate::app::pipeline::RunOutput;
use crate::domain::{AssetMetrics, ReportMetrics};

/// Format the complete run summary.
pub fn format_run_summary(output: &RunOutput) -> String {
    let m = &output.metrics;
    let mut out = String::new();

    out.push_str("=== dca - Weekly DCA Comparison ===\n");
    out.push_str(&format!(
        "Range: {} through {} ({} years)\n",
        m.range.start, m.range.end, m.range.years
    ));
    out.push_str(&format!("Weeks simulated: {}\n", output.sim_a.rows.len()));

    if let Some(note) = &output.inflation_note {
        out.push_str(&format!("\nwarning: {note}\n"));
    }

    out.push_str(&format!(
        "\nWeekly DCA of ${} for {} years (market sell on {}):\n",
        m.weekly_investment, m.range.years, m.range.end
    ));
    out.push_str(&format!(
        "Total invested: ${}\n",
        fmt_usd(m.asset_a.total_invested)
    ));
    if !m.inflation_disabled {
        out.push_str(&format!(
            "USD has lost {}% of its value over this period.\n",
            m.inflation_rate_pct
        ));
    }

    out.push_str(&format_asset_results(&m.asset_a, m));
    out.push_str(&format_asset_results(&m.asset_b, m));

    out.push_str(&format!(
        "\nThese two assets have a correlation of {}. \
         For every $1 increase in the weaker asset, the other increased by ~{}x.\n",
        m.correlation, m.slope_magnitude
    ));

    out
}

fn format_asset_results(asset: &AssetMetrics, m: &ReportMetrics) -> String {
    let mut out = String::new();

    out.push_str(&format!("\nRESULTS {}:\n", asset.asset.to_uppercase()));
    out.push_str(&format!("Ending Value: ${}\n", fmt_usd(asset.ending_value)));
    out.push_str(&format!(
        "Ending Quantity: {} units of {}\n",
        asset.ending_qty, asset.asset
    ));
    out.push_str(&format!("Nominal ROI: {}%\n", asset.nominal_roi_pct));

    if !m.inflation_disabled {
        out.push_str(&format!(
            "Real ROI: {}% - that's ${} in {} dollars.\n",
            asset.real_roi_pct,
            fmt_usd(asset.inflation_adjusted_usd),
            m.range.start.format("%Y"),
        ));
    }

    out
}

/// Whole-dollar formatting with thousands separators (`1234567.89` -> `1,234,568`).
fn fmt_usd(v: f64) -> String {
    let rounded = v.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}
