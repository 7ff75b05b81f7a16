//! Command-line parsing for the DCA comparison reporter.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the pipeline/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::JoinMode;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dca", version, about = "Weekly DCA comparison of two assets")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full report: summary text, terminal chart, optional exports.
    Report(ReportArgs),
    /// Print the computed metrics as JSON only (useful for scripting).
    Metrics(ReportArgs),
}

/// Common options for reporting.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    /// First asset identifier, matched case-insensitively against file names.
    pub asset1: String,

    /// Second asset identifier.
    pub asset2: String,

    /// Directory holding one price-history .csv per asset.
    #[arg(short = 'd', long, default_value = ".")]
    pub dir: PathBuf,

    /// Fixed amount invested each week, in dollars.
    #[arg(short = 'a', long, default_value_t = 50.0)]
    pub amount: f64,

    /// How to join the two daily series on date before weekly resampling.
    #[arg(long, value_enum, default_value_t = JoinMode::Outer)]
    pub join: JoinMode,

    /// Moving-average smoothing window for the chart, in weeks (0 disables).
    #[arg(long, default_value_t = 0)]
    pub ma_weeks: usize,

    /// Render the comparison chart in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal chart.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Chart height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the weekly table and both raw series as CSVs into this directory.
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Export the metrics bundle as JSON.
    #[arg(long = "export-metrics", value_name = "JSON")]
    pub export_metrics: Option<PathBuf>,
}
