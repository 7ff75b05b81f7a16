//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during the simulation
//! - exported to CSV/JSON
//! - consumed read-only by the presentation layer

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;

/// One daily observation: an asset's closing price on one trading day.
///
/// Source granularity; immutable once loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Ordered daily price history for one asset.
///
/// Invariants (enforced by the loader): non-empty, dates strictly increasing,
/// all closes finite.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub asset: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    /// First and last observation dates. `None` only for an empty series,
    /// which the loader rejects before anything downstream runs.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.points.first()?.date, self.points.last()?.date))
    }
}

/// The validated common window of the two series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Day-count / 365, rounded to 2dp (not calendar years).
    pub years: f64,
}

/// How the two daily series are merged on date before weekly resampling.
///
/// Some assets trade on weekends while others don't, so `outer` is the
/// default: keep every date either series has. `inner` is the stricter mode
/// and the one to reach for when sparse history produces empty weekly buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum JoinMode {
    Outer,
    Inner,
    Left,
    Right,
}

/// One row of the aligned weekly table.
///
/// `None` means the bucket had zero daily observations for that asset under
/// the join mode used (the NaN-propagation case).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyRow {
    /// Monday-convention week-ending label.
    pub week_ending: NaiveDate,
    pub close_a: Option<f64>,
    pub close_b: Option<f64>,
}

/// The canonical aligned table: one row per Monday-ending week in range,
/// mean closing price per asset per week.
///
/// Invariant: `week_ending` strictly increasing, exactly one row per week.
#[derive(Debug, Clone)]
pub struct AlignedWeeklyTable {
    pub asset_a: String,
    pub asset_b: String,
    pub rows: Vec<WeeklyRow>,
}

impl AlignedWeeklyTable {
    /// Weekly mean closes for one side, in chronological order.
    pub fn closes(&self, side: AssetSide) -> impl Iterator<Item = Option<f64>> + '_ {
        self.rows.iter().map(move |r| match side {
            AssetSide::A => r.close_a,
            AssetSide::B => r.close_b,
        })
    }

    pub fn asset_name(&self, side: AssetSide) -> &str {
        match side {
            AssetSide::A => &self.asset_a,
            AssetSide::B => &self.asset_b,
        }
    }
}

/// Which of the two assets a simulation runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetSide {
    A,
    B,
}

/// One week of a completed DCA simulation for a single asset.
///
/// Owned exclusively by that asset's `DcaSimulation`; never shared across
/// assets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationRow {
    pub week_ending: NaiveDate,
    /// Units bought this week with the fixed investment, rounded 2dp.
    pub purchase_qty: f64,
    /// Running sum of the rounded purchase column.
    pub cumulative_qty: f64,
    /// Holdings marked to this week's average price, rounded 2dp.
    pub portfolio_value: f64,
}

/// CPI values at the start and end months of the report window.
///
/// `(0, 0)` is the sentinel for "inflation unknown / treat as zero"; it is an
/// explicit value passed by reference into the return calculators, never
/// hidden global state. Fetched once per run, read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InflationWindow {
    pub cpi_start: f64,
    pub cpi_end: f64,
}

impl InflationWindow {
    pub fn new(cpi_start: f64, cpi_end: f64) -> Self {
        Self { cpi_start, cpi_end }
    }

    /// The "inflation unknown" sentinel.
    pub fn disabled() -> Self {
        Self {
            cpi_start: 0.0,
            cpi_end: 0.0,
        }
    }

    /// True when the window cannot support a real-ROI calculation and the
    /// report must fall back to nominal-only mode.
    pub fn is_disabled(&self) -> bool {
        !(self.cpi_start.is_finite() && self.cpi_end.is_finite())
            || self.cpi_start <= 0.0
            || self.cpi_end <= 0.0
    }
}

impl Default for InflationWindow {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Final per-asset scalar bundle. Immutable once computed.
#[derive(Debug, Clone, Serialize)]
pub struct AssetMetrics {
    pub asset: String,
    pub total_invested: f64,
    pub ending_qty: f64,
    pub ending_value: f64,
    pub nominal_roi_pct: f64,
    pub real_roi_pct: f64,
    /// Ending value expressed in start-of-window purchasing power.
    pub inflation_adjusted_usd: f64,
}

/// The complete report bundle consumed by the presentation layer and the
/// metrics JSON export.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetrics {
    pub range: DateRange,
    pub weekly_investment: f64,
    pub inflation_rate_pct: f64,
    /// True when the CPI window is the sentinel and real-ROI figures are
    /// degenerate copies of the nominal ones.
    pub inflation_disabled: bool,
    pub asset_a: AssetMetrics,
    pub asset_b: AssetMetrics,
    pub correlation: f64,
    /// Larger-magnitude of the two directional regression slopes, truncated
    /// to an integer. See DESIGN.md for the tie-break rule.
    pub slope_magnitude: i64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub data_dir: PathBuf,
    pub asset_a: String,
    pub asset_b: String,
    pub weekly_investment: f64,
    pub join_mode: JoinMode,

    /// Moving-average window (weeks) applied by the chart only. 0 disables.
    pub ma_weeks: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_dir: Option<PathBuf>,
    pub export_metrics: Option<PathBuf>,
}
