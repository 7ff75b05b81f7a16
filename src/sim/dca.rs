//! Weekly DCA accumulation for one asset.
//!
//! The simulator walks the aligned weekly table once, in chronological order,
//! and produces a per-week trajectory: units bought that week, units held so
//! far, and the holding marked to that week's average price. It assumes clean
//! upstream data; a zero or missing weekly price is a fatal error here, not
//! something to paper over.

use crate::domain::{AlignedWeeklyTable, AssetSide, SimulationRow};
use crate::error::{AppError, ErrorKind};
use crate::math::round_dp;

/// A completed single-asset simulation.
///
/// Exclusively owns its rows; the other asset's simulation never touches them.
#[derive(Debug, Clone)]
pub struct DcaSimulation {
    pub asset: String,
    pub weekly_investment: f64,
    pub rows: Vec<SimulationRow>,
}

impl DcaSimulation {
    /// Run the accumulation over one side of the aligned table.
    pub fn run(
        table: &AlignedWeeklyTable,
        side: AssetSide,
        weekly_investment: f64,
    ) -> Result<Self, AppError> {
        let asset = table.asset_name(side).to_string();
        let mut rows = Vec::with_capacity(table.rows.len());

        // Cumulative sum of the rounded purchase column, so the running total
        // carries exactly the rounding the per-week figures show.
        let mut cumulative_qty = 0.0;

        for (row, close) in table.rows.iter().zip(table.closes(side)) {
            let price = match close {
                Some(p) if p > 0.0 => p,
                Some(_) | None => {
                    return Err(AppError::new(
                        ErrorKind::DivisionByZero,
                        format!(
                            "no usable weekly price for '{asset}' in the week ending {}. \
                             Try `--join inner` to drop weeks one asset didn't trade.",
                            row.week_ending
                        ),
                    ));
                }
            };

            let purchase_qty = round_dp(weekly_investment / price, 2);
            cumulative_qty += purchase_qty;
            rows.push(SimulationRow {
                week_ending: row.week_ending,
                purchase_qty,
                cumulative_qty,
                portfolio_value: round_dp(cumulative_qty * price, 2),
            });
        }

        Ok(Self {
            asset,
            weekly_investment,
            rows,
        })
    }

    /// Total units bought over the whole window, rounded 2dp.
    pub fn total_asset_purchased(&self) -> f64 {
        round_dp(self.rows.iter().map(|r| r.purchase_qty).sum(), 2)
    }

    /// Total dollars put in: weeks simulated times the fixed amount.
    pub fn total_usd_invested(&self) -> f64 {
        round_dp(self.rows.len() as f64 * self.weekly_investment, 2)
    }

    /// Portfolio value on the last simulated week.
    pub fn ending_investment_value(&self) -> f64 {
        self.rows.last().map(|r| r.portfolio_value).unwrap_or(0.0)
    }

    /// Nominal return on investment over the window, as a percent, 2dp.
    ///
    /// Zero weeks simulated is a precondition violation (the loader guarantees
    /// at least a year of history), reported as such rather than recovered.
    pub fn nominal_roi(&self) -> Result<f64, AppError> {
        let invested = self.total_usd_invested();
        if invested <= 0.0 {
            return Err(AppError::new(
                ErrorKind::DivisionByZero,
                format!("no weeks were simulated for '{}'; nominal ROI is undefined.", self.asset),
            ));
        }
        let ending = self.ending_investment_value();
        Ok(round_dp((ending - invested) / invested * 100.0, 2))
    }
}
