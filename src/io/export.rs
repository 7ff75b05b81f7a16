//! Tabular and JSON exports.
//!
//! The "workbook" export is three CSV files in one directory: the aligned
//! weekly table plus each asset's raw imported series. They are meant to be
//! easy to consume in spreadsheets or downstream scripts. The metrics export
//! is the full `ReportMetrics` bundle as pretty JSON.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::{AlignedWeeklyTable, PriceSeries, ReportMetrics};
use crate::error::{AppError, ErrorKind};

/// Write the weekly table and both raw series as CSVs under `dir`.
///
/// Returns the paths written, in the order: weekly, raw A, raw B.
pub fn write_tables_csv(
    dir: &Path,
    table: &AlignedWeeklyTable,
    series_a: &PriceSeries,
    series_b: &PriceSeries,
) -> Result<Vec<PathBuf>, AppError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        AppError::new(
            ErrorKind::Export,
            format!("failed to create export directory '{}': {e}", dir.display()),
        )
    })?;

    let slug_a = file_slug(&table.asset_a);
    let slug_b = file_slug(&table.asset_b);

    let weekly_path = dir.join(format!("weekly_{slug_a}_x_{slug_b}.csv"));
    write_weekly_csv(&weekly_path, table)?;

    let raw_a_path = dir.join(format!("raw_{slug_a}.csv"));
    write_raw_csv(&raw_a_path, series_a)?;

    let raw_b_path = dir.join(format!("raw_{slug_b}.csv"));
    write_raw_csv(&raw_b_path, series_b)?;

    Ok(vec![weekly_path, raw_a_path, raw_b_path])
}

fn write_weekly_csv(path: &Path, table: &AlignedWeeklyTable) -> Result<(), AppError> {
    let mut file = create(path)?;

    writeln!(
        file,
        "date,{}_close,{}_close",
        file_slug(&table.asset_a),
        file_slug(&table.asset_b)
    )
    .map_err(|e| write_err(path, e))?;

    for row in &table.rows {
        writeln!(
            file,
            "{},{},{}",
            row.week_ending,
            fmt_opt(row.close_a),
            fmt_opt(row.close_b)
        )
        .map_err(|e| write_err(path, e))?;
    }

    Ok(())
}

fn write_raw_csv(path: &Path, series: &PriceSeries) -> Result<(), AppError> {
    let mut file = create(path)?;

    writeln!(file, "date,close").map_err(|e| write_err(path, e))?;
    for point in &series.points {
        writeln!(file, "{},{}", point.date, point.close).map_err(|e| write_err(path, e))?;
    }

    Ok(())
}

/// Write the metrics bundle as pretty JSON.
pub fn write_metrics_json(path: &Path, metrics: &ReportMetrics) -> Result<(), AppError> {
    let file = create(path)?;
    serde_json::to_writer_pretty(file, metrics).map_err(|e| {
        AppError::new(
            ErrorKind::Export,
            format!("failed to write metrics JSON '{}': {e}", path.display()),
        )
    })?;
    Ok(())
}

fn create(path: &Path) -> Result<File, AppError> {
    File::create(path).map_err(|e| {
        AppError::new(
            ErrorKind::Export,
            format!("failed to create export file '{}': {e}", path.display()),
        )
    })
}

fn write_err(path: &Path, e: std::io::Error) -> AppError {
    AppError::new(
        ErrorKind::Export,
        format!("failed to write '{}': {e}", path.display()),
    )
}

/// Empty cell for a missing weekly mean (spreadsheets read it as blank/NaN).
fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

/// Lowercased identifier safe for file names.
fn file_slug(asset: &str) -> String {
    asset
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
