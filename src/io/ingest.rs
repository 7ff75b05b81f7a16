//! Price-history CSV ingest and validation.
//!
//! This module turns a directory of exchange exports into two clean
//! `PriceSeries`, or fails with a specific, actionable diagnostic.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Deterministic file selection** (case-insensitive substring match)
//! - **Separation of concerns**: no resampling or simulation logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{DateRange, PricePoint, PriceSeries, ReportConfig};
use crate::error::{AppError, ErrorKind};
use crate::math::round_dp;

/// Minimum overlap (day-count, not calendar years) the report requires.
const MIN_HISTORY_DAYS: i64 = 365;

/// Both loaded series plus their validated common window.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub series_a: PriceSeries,
    pub series_b: PriceSeries,
    pub range: DateRange,
}

/// Locate, load, and validate both price histories.
pub fn load_price_series(config: &ReportConfig) -> Result<LoadedSeries, AppError> {
    let names = list_file_names(&config.data_dir)?;

    let file_a = find_asset_file(&names, &config.asset_a, &config.data_dir)?;
    let file_b = find_asset_file(&names, &config.asset_b, &config.data_dir)?;
    if file_a == file_b {
        return Err(AppError::new(
            ErrorKind::DataSource,
            format!(
                "'{file_a}' matches both asset identifiers '{}' and '{}'. \
                 Each asset needs its own .csv file.",
                config.asset_a, config.asset_b
            ),
        ));
    }

    let series_a = read_series(&config.data_dir.join(&file_a), &config.asset_a)?;
    let series_b = read_series(&config.data_dir.join(&file_b), &config.asset_b)?;

    let range = determine_date_range(&series_a, &series_b)?;

    Ok(LoadedSeries {
        series_a,
        series_b,
        range,
    })
}

/// Validate that both series cover the same window and that it is long enough.
///
/// Returns the window with `years = days/365` rounded to 2dp.
pub fn determine_date_range(a: &PriceSeries, b: &PriceSeries) -> Result<DateRange, AppError> {
    let (start_a, end_a) = a.date_bounds().ok_or_else(|| empty_series(&a.asset))?;
    let (start_b, end_b) = b.date_bounds().ok_or_else(|| empty_series(&b.asset))?;

    if start_a != start_b || end_a != end_b {
        return Err(AppError::new(
            ErrorKind::DateRangeMismatch,
            format!(
                "the date ranges of the two datasets do not match: \
                 '{}' spans {start_a} through {end_a}, '{}' spans {start_b} through {end_b}. \
                 Both datasets must start and end on the same dates.",
                a.asset, b.asset
            ),
        ));
    }

    let days = (end_a - start_a).num_days();
    if days < MIN_HISTORY_DAYS {
        return Err(AppError::new(
            ErrorKind::InsufficientHistory,
            format!(
                "this report needs at least 1 year of price history; \
                 you've provided just {days} days worth."
            ),
        ));
    }

    Ok(DateRange {
        start: start_a,
        end: end_a,
        years: round_dp(days as f64 / 365.0, 2),
    })
}

fn empty_series(asset: &str) -> AppError {
    AppError::new(
        ErrorKind::DataSource,
        format!("the price series for '{asset}' is empty."),
    )
}

/// Pick exactly one `.csv` file whose name contains the asset identifier
/// (case-insensitive). Zero or multiple matches are configuration errors.
pub fn find_asset_file(names: &[String], asset: &str, dir: &Path) -> Result<String, AppError> {
    let needle = asset.to_lowercase();
    let matches: Vec<&String> = names
        .iter()
        .filter(|n| {
            let lower = n.to_lowercase();
            lower.ends_with(".csv") && lower.contains(&needle)
        })
        .collect();

    match matches.as_slice() {
        [one] => Ok((*one).clone()),
        [] => Err(AppError::new(
            ErrorKind::DataSource,
            format!(
                "no .csv file matching '{asset}' found in '{}'. \
                 Check that the directory holds one price-history file per asset \
                 and that the asset identifiers correspond to the file names.",
                dir.display()
            ),
        )),
        many => Err(AppError::new(
            ErrorKind::DataSource,
            format!(
                "{} .csv files match '{asset}' in '{}' ({}); only one is allowed. \
                 Remove or rename the extras and try again.",
                many.len(),
                dir.display(),
                many.iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        )),
    }
}

fn list_file_names(dir: &Path) -> Result<Vec<String>, AppError> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        AppError::new(
            ErrorKind::DataSource,
            format!("failed to read data directory '{}': {e}", dir.display()),
        )
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            AppError::new(
                ErrorKind::DataSource,
                format!("failed to read data directory '{}': {e}", dir.display()),
            )
        })?;
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Load one CSV into a sorted, validated `PriceSeries`.
fn read_series(path: &Path, asset: &str) -> Result<PriceSeries, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            ErrorKind::DataSource,
            format!("failed to open '{}': {e}", path.display()),
        )
    })?;
    read_series_from(file, path, asset)
}

/// Parse and validate one CSV stream. `path` is used for diagnostics only.
fn read_series_from(
    input: impl std::io::Read,
    path: &Path,
    asset: &str,
) -> Result<PriceSeries, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| {
            AppError::new(
                ErrorKind::DataSource,
                format!("failed to read CSV headers of '{}': {e}", path.display()),
            )
        })?
        .clone();

    let header_map = build_header_map(&headers);
    let date_idx = require_column(&header_map, "date", path)?;
    let close_idx = require_column(&header_map, "close", path)?;

    let mut points = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header row, and CSV lines are 1-based.
        let line = idx + 2;

        let record = result.map_err(|e| {
            AppError::new(
                ErrorKind::DataSource,
                format!("CSV parse error in '{}' line {line}: {e}", path.display()),
            )
        })?;

        let date = parse_date(get_field(&record, date_idx, "date", path, line)?)
            .map_err(|msg| {
                AppError::new(
                    ErrorKind::DataSource,
                    format!("'{}' line {line}: {msg}", path.display()),
                )
            })?;

        let close_raw = get_field(&record, close_idx, "close", path, line)?;
        let close = close_raw.parse::<f64>().ok().filter(|v| v.is_finite()).ok_or_else(|| {
            AppError::new(
                ErrorKind::DataSource,
                format!(
                    "'{}' line {line}: invalid close price '{close_raw}'.",
                    path.display()
                ),
            )
        })?;

        points.push(PricePoint { date, close });
    }

    if points.is_empty() {
        return Err(AppError::new(
            ErrorKind::DataSource,
            format!("'{}' contains no data rows.", path.display()),
        ));
    }

    points.sort_by_key(|p| p.date);
    for pair in points.windows(2) {
        if pair[0].date == pair[1].date {
            return Err(AppError::new(
                ErrorKind::DataSource,
                format!(
                    "'{}' has duplicate rows for {}; dates must be unique within one series.",
                    path.display(),
                    pair[0].date
                ),
            ));
        }
    }

    Ok(PriceSeries {
        asset: asset.to_string(),
        points,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿Date"). If we don't strip it, schema validation
    // will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn require_column(
    header_map: &HashMap<String, usize>,
    name: &str,
    path: &Path,
) -> Result<usize, AppError> {
    header_map.get(name).copied().ok_or_else(|| {
        AppError::new(
            ErrorKind::DataSource,
            format!(
                "'{}' is missing the required column `{name}`. \
                 Each price-history file needs a date column and a closing-price column.",
                path.display()
            ),
        )
    })
}

fn get_field<'a>(
    record: &'a StringRecord,
    idx: usize,
    name: &str,
    path: &Path,
    line: usize,
) -> Result<&'a str, AppError> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            AppError::new(
                ErrorKind::DataSource,
                format!("'{}' line {line}: missing `{name}` value.", path.display()),
            )
        })
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // ISO dates are the recommendation, but market-data exports commonly use
    // a handful of other layouts. Accept a small deterministic set.
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(asset: &str, dates: &[(i32, u32, u32)]) -> PriceSeries {
        PriceSeries {
            asset: asset.to_string(),
            points: dates
                .iter()
                .map(|&(y, m, d)| PricePoint {
                    date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
                    close: 10.0,
                })
                .collect(),
        }
    }

    #[test]
    fn find_asset_file_is_case_insensitive_substring() {
        let names = vec![
            "BTC-USD History.csv".to_string(),
            "gold_prices.csv".to_string(),
            "notes.txt".to_string(),
        ];
        let dir = Path::new(".");

        assert_eq!(
            find_asset_file(&names, "btc", dir).unwrap(),
            "BTC-USD History.csv"
        );
        assert_eq!(find_asset_file(&names, "GOLD", dir).unwrap(), "gold_prices.csv");
    }

    #[test]
    fn find_asset_file_rejects_zero_and_multiple_matches() {
        let names = vec!["btc_a.csv".to_string(), "btc_b.csv".to_string()];
        let dir = Path::new(".");

        let err = find_asset_file(&names, "eth", dir).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataSource);

        let err = find_asset_file(&names, "btc", dir).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataSource);
        assert!(format!("{err}").contains("only one is allowed"));
    }

    #[test]
    fn find_asset_file_ignores_non_csv() {
        let names = vec!["btc.json".to_string(), "btc.csv".to_string()];
        assert_eq!(
            find_asset_file(&names, "btc", Path::new(".")).unwrap(),
            "btc.csv"
        );
    }

    #[test]
    fn date_range_happy_path_rounds_years() {
        // 730 days apart -> exactly 2.0 years by day-count/365.
        let a = series("a", &[(2020, 1, 1), (2022, 1, 1)]);
        let b = series("b", &[(2020, 1, 1), (2021, 6, 1), (2022, 1, 1)]);

        let range = determine_date_range(&a, &b).unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
        assert_eq!(range.years, 2.0);
    }

    #[test]
    fn date_range_mismatch_by_one_day_is_fatal() {
        let a = series("a", &[(2020, 1, 1), (2022, 1, 1)]);
        let b = series("b", &[(2020, 1, 2), (2022, 1, 1)]);

        let err = determine_date_range(&a, &b).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DateRangeMismatch);
    }

    #[test]
    fn short_history_is_fatal() {
        let a = series("a", &[(2021, 1, 1), (2021, 12, 1)]);
        let b = series("b", &[(2021, 1, 1), (2021, 12, 1)]);

        let err = determine_date_range(&a, &b).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientHistory);
        assert!(format!("{err}").contains("334 days"));
    }

    #[test]
    fn exactly_365_days_is_accepted() {
        let a = series("a", &[(2021, 1, 1), (2022, 1, 1)]);
        let b = series("b", &[(2021, 1, 1), (2022, 1, 1)]);

        let range = determine_date_range(&a, &b).unwrap();
        assert_eq!(range.years, 1.0);
    }

    #[test]
    fn parse_date_accepts_common_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 5).unwrap();
        assert_eq!(parse_date("2021-03-05").unwrap(), expected);
        assert_eq!(parse_date("05/03/2021").unwrap(), expected);
        assert_eq!(parse_date("05-03-2021").unwrap(), expected);
        assert_eq!(parse_date("2021/03/05").unwrap(), expected);
        assert!(parse_date("March 5, 2021").is_err());
    }

    #[test]
    fn header_normalization_strips_bom_and_case() {
        assert_eq!(normalize_header_name("\u{feff}Date"), "date");
        assert_eq!(normalize_header_name("  Close "), "close");
    }

    fn parse_csv(content: &str) -> Result<PriceSeries, AppError> {
        read_series_from(content.as_bytes(), Path::new("test.csv"), "btc")
    }

    #[test]
    fn read_series_tolerates_bom_case_and_whitespace() {
        // BOM on the first header, mixed-case names, padded cells, rows out
        // of order: all load to the same clean series.
        let content = "\u{feff}Date , CLOSE\n2020-01-08 , 11.5 \n2020-01-01,10\n";
        let series = parse_csv(content).unwrap();

        assert_eq!(series.asset, "btc");
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.points[0].date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(series.points[0].close, 10.0);
        assert_eq!(series.points[1].close, 11.5);
    }

    #[test]
    fn read_series_rejects_duplicate_dates() {
        let content = "date,close\n2020-01-01,10\n2020-01-01,11\n";
        let err = parse_csv(content).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataSource);
        assert!(format!("{err}").contains("duplicate"));
    }

    #[test]
    fn read_series_rejects_header_only_file() {
        let err = parse_csv("date,close\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataSource);
        assert!(format!("{err}").contains("no data rows"));
    }

    #[test]
    fn read_series_rejects_missing_close_column() {
        let err = parse_csv("date,price\n2020-01-01,10\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataSource);
        assert!(format!("{err}").contains("close"));
    }

    #[test]
    fn read_series_reports_bad_values_with_line_numbers() {
        let err = parse_csv("date,close\n2020-01-01,10\nnot-a-date,11\n").unwrap_err();
        assert!(format!("{err}").contains("line 3"));

        let err = parse_csv("date,close\n2020-01-01,abc\n").unwrap_err();
        assert!(format!("{err}").contains("line 2"));
        assert!(format!("{err}").contains("abc"));
    }
}
