//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the report pipeline
//! - prints the summary/chart or the metrics JSON
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, ReportArgs};
use crate::data::cpi::{FredCpiClient, InflationProvider};
use crate::domain::ReportConfig;
use crate::error::{AppError, ErrorKind};

pub mod pipeline;

/// Entry point for the `dca` binary.
pub fn run() -> Result<(), AppError> {
    // We want `dca btc gold` to behave like `dca report btc gold`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while retaining the short UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => handle_report(args, OutputMode::Full),
        Command::Metrics(args) => handle_report(args, OutputMode::MetricsOnly),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    MetricsOnly,
}

fn handle_report(args: ReportArgs, mode: OutputMode) -> Result<(), AppError> {
    let config = report_config_from_args(&args)?;
    let provider = EnvFredCpi;
    let run = pipeline::run_report(&config, &provider)?;

    match mode {
        OutputMode::Full => {
            println!("{}", crate::report::format_run_summary(&run));

            if config.plot {
                let chart = crate::plot::render_comparison_chart(
                    &run.sim_a,
                    &run.sim_b,
                    config.ma_weeks,
                    config.plot_width,
                    config.plot_height,
                );
                println!("{chart}");
            }
        }
        OutputMode::MetricsOnly => {
            let json = serde_json::to_string_pretty(&run.metrics).map_err(|e| {
                AppError::new(ErrorKind::Export, format!("failed to serialize metrics: {e}"))
            })?;
            println!("{json}");
        }
    }

    // Optional exports.
    if let Some(dir) = &config.export_dir {
        crate::io::export::write_tables_csv(dir, &run.table, &run.series_a, &run.series_b)?;
    }
    if let Some(path) = &config.export_metrics {
        crate::io::export::write_metrics_json(path, &run.metrics)?;
    }

    Ok(())
}

/// CPI provider that resolves credentials at fetch time.
///
/// Construction never fails; a missing `FRED_API_KEY` surfaces as a fetch
/// error, which the pipeline absorbs into the sentinel window.
struct EnvFredCpi;

impl InflationProvider for EnvFredCpi {
    fn fetch_window(
        &self,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> Result<crate::domain::InflationWindow, AppError> {
        FredCpiClient::from_env()?.fetch_window(start, end)
    }
}

pub fn report_config_from_args(args: &ReportArgs) -> Result<ReportConfig, AppError> {
    if !(args.amount.is_finite() && args.amount > 0.0) {
        return Err(AppError::new(
            ErrorKind::DataSource,
            format!(
                "the weekly investment amount must be a positive number (got {}).",
                args.amount
            ),
        ));
    }

    Ok(ReportConfig {
        data_dir: args.dir.clone(),
        asset_a: args.asset1.clone(),
        asset_b: args.asset2.clone(),
        weekly_investment: args.amount,
        join_mode: args.join,
        ma_weeks: args.ma_weeks,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_dir: args.export_dir.clone(),
        export_metrics: args.export_metrics.clone(),
    })
}

/// Rewrite argv so `dca` defaults to `dca report`.
///
/// Rules:
/// - `dca btc gold ...`        -> `dca report btc gold ...`
/// - `dca -d data btc gold`    -> `dca report -d data btc gold`
/// - `dca --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "metrics");
    if is_subcommand {
        return argv;
    }

    argv.insert(1, "report".to_string());
    argv
}
