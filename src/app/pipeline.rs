//! Shared report pipeline used by both output modes.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> validate range -> weekly aggregate -> simulate x2 -> inflation ->
//! correlation -> metrics
//!
//! The front-end then focuses on presentation (summary text, chart, exports).
//! Everything here is synchronous and single-threaded; the only I/O is the
//! initial file reads and the one best-effort CPI fetch.

use crate::data::cpi::InflationProvider;
use crate::data::weekly::aggregate_weekly;
use crate::domain::{
    AlignedWeeklyTable, AssetMetrics, AssetSide, DateRange, InflationWindow, PriceSeries,
    ReportConfig, ReportMetrics,
};
use crate::error::AppError;
use crate::io::ingest::{LoadedSeries, load_price_series};
use crate::math::stats::cross_stats;
use crate::sim::dca::DcaSimulation;
use crate::sim::returns::{inflation_rate_pct, real_roi_pct, usd_return_inflation_adjusted};

/// All computed outputs of a single report run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub series_a: PriceSeries,
    pub series_b: PriceSeries,
    pub table: AlignedWeeklyTable,
    pub sim_a: DcaSimulation,
    pub sim_b: DcaSimulation,
    pub window: InflationWindow,
    /// Set when the CPI lookup degraded to the sentinel; surfaced in the
    /// report header so the degraded mode is explicit, never silent.
    pub inflation_note: Option<String>,
    pub metrics: ReportMetrics,
}

/// Execute the full pipeline from the configured data directory.
pub fn run_report(
    config: &ReportConfig,
    provider: &dyn InflationProvider,
) -> Result<RunOutput, AppError> {
    let loaded = load_price_series(config)?;
    run_report_with_series(config, loaded, provider)
}

/// Execute the pipeline on pre-loaded series.
///
/// Split out so tests can drive the whole engine from in-memory data.
pub fn run_report_with_series(
    config: &ReportConfig,
    loaded: LoadedSeries,
    provider: &dyn InflationProvider,
) -> Result<RunOutput, AppError> {
    let LoadedSeries {
        series_a,
        series_b,
        range,
    } = loaded;

    let table = aggregate_weekly(&series_a, &series_b, config.join_mode);

    // Independent simulations over the shared read-only table.
    let sim_a = DcaSimulation::run(&table, AssetSide::A, config.weekly_investment)?;
    let sim_b = DcaSimulation::run(&table, AssetSide::B, config.weekly_investment)?;

    // Fetched once per run, read-only afterwards.
    let (window, inflation_note) = resolve_inflation(provider, &range);

    let stats = cross_stats(&table)?;
    let rate = inflation_rate_pct(&window);

    let metrics = ReportMetrics {
        range,
        weekly_investment: config.weekly_investment,
        inflation_rate_pct: rate,
        inflation_disabled: window.is_disabled(),
        asset_a: asset_metrics(&sim_a, rate)?,
        asset_b: asset_metrics(&sim_b, rate)?,
        correlation: stats.correlation,
        slope_magnitude: stats.slope_magnitude,
    };

    Ok(RunOutput {
        series_a,
        series_b,
        table,
        sim_a,
        sim_b,
        window,
        inflation_note,
        metrics,
    })
}

/// Best-effort CPI lookup: any failure becomes the sentinel plus a warning.
fn resolve_inflation(
    provider: &dyn InflationProvider,
    range: &DateRange,
) -> (InflationWindow, Option<String>) {
    match provider.fetch_window(range.start, range.end) {
        Ok(window) => (window, None),
        Err(err) => (
            InflationWindow::disabled(),
            Some(format!(
                "couldn't determine inflation for this date range ({err}); \
                 the report will proceed assuming 0 inflation."
            )),
        ),
    }
}

fn asset_metrics(sim: &DcaSimulation, inflation_rate: f64) -> Result<AssetMetrics, AppError> {
    let nominal = sim.nominal_roi()?;
    let real = real_roi_pct(nominal, inflation_rate);
    Ok(AssetMetrics {
        asset: sim.asset.clone(),
        total_invested: sim.total_usd_invested(),
        ending_qty: sim.total_asset_purchased(),
        ending_value: sim.ending_investment_value(),
        nominal_roi_pct: nominal,
        real_roi_pct: real,
        inflation_adjusted_usd: usd_return_inflation_adjusted(sim.total_usd_invested(), real),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JoinMode, PricePoint};
    use crate::io::ingest::determine_date_range;
    use chrono::{Days, NaiveDate};

    struct FixedProvider(InflationWindow);

    impl InflationProvider for FixedProvider {
        fn fetch_window(
            &self,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<InflationWindow, AppError> {
            Ok(self.0)
        }
    }

    struct FailingProvider;

    impl InflationProvider for FailingProvider {
        fn fetch_window(
            &self,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<InflationWindow, AppError> {
            Err(AppError::new(
                crate::error::ErrorKind::DataSource,
                "CPI request failed: unreachable",
            ))
        }
    }

    fn weekly_series(asset: &str, weeks: usize, price: f64, step: f64) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(); // a Monday
        PriceSeries {
            asset: asset.to_string(),
            points: (0..weeks)
                .map(|i| PricePoint {
                    date: start + Days::new(7 * i as u64),
                    close: price + i as f64 * step,
                })
                .collect(),
        }
    }

    fn config() -> ReportConfig {
        ReportConfig {
            data_dir: ".".into(),
            asset_a: "btc".to_string(),
            asset_b: "gold".to_string(),
            weekly_investment: 50.0,
            join_mode: JoinMode::Outer,
            ma_weeks: 0,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            export_dir: None,
            export_metrics: None,
        }
    }

    fn loaded(a: PriceSeries, b: PriceSeries) -> LoadedSeries {
        let range = determine_date_range(&a, &b).unwrap();
        LoadedSeries {
            series_a: a,
            series_b: b,
            range,
        }
    }

    #[test]
    fn end_to_end_metrics_bundle() {
        // 5 years of weekly data, both assets drifting up in lockstep:
        // B gains $1.00 per week for every $0.40 of A, so the directional
        // slopes are 2.5 and 0.4.
        let weeks = 261;
        let a = weekly_series("btc", weeks, 10.0, 0.4);
        let b = weekly_series("gold", weeks, 1200.0, 1.0);

        let out = run_report_with_series(
            &config(),
            loaded(a, b),
            &FixedProvider(InflationWindow::new(247.867, 299.170)),
        )
        .unwrap();

        let m = &out.metrics.asset_a;
        assert_eq!(m.total_invested, weeks as f64 * 50.0);
        assert!(m.ending_qty > 0.0);
        // Steadily rising price with fixed weekly buys: the average entry is
        // below the final price, so the nominal ROI must be positive.
        assert!(m.nominal_roi_pct > 0.0);
        assert!(m.ending_value > m.total_invested);

        // Both series are linear in the week index, so they are perfectly
        // correlated; the larger-magnitude directional slope is 2.5,
        // truncated to 2.
        assert_eq!(out.metrics.correlation, 1.0);
        assert_eq!(out.metrics.slope_magnitude, 2);

        assert!(!out.metrics.inflation_disabled);
        assert_eq!(out.metrics.inflation_rate_pct, 20.7);
        assert!(out.inflation_note.is_none());
    }

    #[test]
    fn constant_asset_terminates_with_numeric_instability() {
        let weeks = 60;
        let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        let a = PriceSeries {
            asset: "btc".to_string(),
            points: (0..weeks)
                .map(|i| PricePoint {
                    date: start + Days::new(7 * i as u64),
                    close: 10.0,
                })
                .collect(),
        };
        let b = weekly_series("gold", weeks, 1200.0, 1.0);

        let err = run_report_with_series(
            &config(),
            loaded(a, b),
            &FixedProvider(InflationWindow::new(250.0, 260.0)),
        )
        .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NumericInstability);
    }

    #[test]
    fn provider_failure_degrades_to_nominal_only() {
        let a = weekly_series("btc", 60, 10.0, 0.4);
        let b = weekly_series("gold", 60, 1200.0, 1.0);

        let out = run_report_with_series(&config(), loaded(a, b), &FailingProvider).unwrap();

        assert!(out.metrics.inflation_disabled);
        assert_eq!(out.metrics.inflation_rate_pct, 0.0);
        assert_eq!(
            out.metrics.asset_a.real_roi_pct,
            out.metrics.asset_a.nominal_roi_pct
        );
        let note = out.inflation_note.unwrap();
        assert!(note.contains("0 inflation"));
    }

    #[test]
    fn simulations_share_the_table_but_not_state() {
        let a = weekly_series("btc", 60, 10.0, 0.4);
        let b = weekly_series("gold", 60, 1200.0, 1.0);

        let out = run_report_with_series(
            &config(),
            loaded(a, b),
            &FixedProvider(InflationWindow::new(250.0, 260.0)),
        )
        .unwrap();

        assert_eq!(out.sim_a.rows.len(), out.sim_b.rows.len());
        assert_ne!(
            out.sim_a.rows[0].purchase_qty,
            out.sim_b.rows[0].purchase_qty
        );
    }
}
