//! CPI lookup via the FRED API.
//!
//! The report window's inflation adjustment needs exactly two index values:
//! the CPI at the start month and at the end month. The lookup is
//! best-effort: whatever goes wrong (missing API key, network failure, a month
//! the series doesn't cover), the pipeline falls back to the
//! `InflationWindow::disabled()` sentinel and the report switches to
//! nominal-only mode. Nothing in this module terminates the run.

use chrono::{Datelike, NaiveDate};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::InflationWindow;
use crate::error::{AppError, ErrorKind};

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

/// CPI for All Urban Consumers, monthly, not seasonally adjusted.
const SERIES_CPI: &str = "CPIAUCNS";

/// Source of the start/end CPI pair.
///
/// A narrow seam so the calculator can be tested against a fake and the
/// concrete source swapped without touching any formula.
pub trait InflationProvider {
    fn fetch_window(&self, start: NaiveDate, end: NaiveDate) -> Result<InflationWindow, AppError>;
}

pub struct FredCpiClient {
    client: Client,
    api_key: String,
}

impl FredCpiClient {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("FRED_API_KEY").map_err(|_| {
            AppError::new(
                ErrorKind::DataSource,
                "missing FRED_API_KEY in environment (.env)",
            )
        })?;
        Ok(Self {
            client: Client::new(),
            api_key,
        })
    }

    fn fetch_series(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, AppError> {
        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("series_id", SERIES_CPI),
                ("api_key", &self.api_key),
                ("file_type", "json"),
                ("observation_start", &start.to_string()),
                ("observation_end", &end.to_string()),
            ])
            .send()
            .map_err(|e| AppError::new(ErrorKind::DataSource, format!("CPI request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                ErrorKind::DataSource,
                format!("CPI request failed with status {}.", resp.status()),
            ));
        }

        let body: ObservationsResponse = resp.json().map_err(|e| {
            AppError::new(ErrorKind::DataSource, format!("failed to parse CPI response: {e}"))
        })?;

        let mut out = Vec::new();
        for obs in body.observations {
            let value = match parse_value(&obs.value) {
                Some(v) => v,
                None => continue,
            };
            let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d").map_err(|e| {
                AppError::new(
                    ErrorKind::DataSource,
                    format!("invalid CPI date '{}': {e}", obs.date),
                )
            })?;
            out.push((date, value));
        }

        Ok(out)
    }
}

impl InflationProvider for FredCpiClient {
    fn fetch_window(&self, start: NaiveDate, end: NaiveDate) -> Result<InflationWindow, AppError> {
        // Widen the query to whole months; FRED stamps monthly observations
        // on the first of the month.
        let query_start = start.with_day(1).unwrap_or(start);
        let observations = self.fetch_series(query_start, end)?;
        window_from_observations(&observations, start, end)
    }
}

/// Pick the CPI values for the start month and end month of the window.
pub fn window_from_observations(
    observations: &[(NaiveDate, f64)],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<InflationWindow, AppError> {
    let cpi_start = find_month(observations, start)
        .ok_or_else(|| missing_month(start))?;
    let cpi_end = find_month(observations, end).ok_or_else(|| missing_month(end))?;

    let window = InflationWindow::new(cpi_start, cpi_end);
    if window.is_disabled() {
        // Non-positive index values would feed a nonsense inflation rate.
        return Err(AppError::new(
            ErrorKind::DataSource,
            "CPI source returned non-positive index values for the requested window.",
        ));
    }
    Ok(window)
}

fn find_month(observations: &[(NaiveDate, f64)], target: NaiveDate) -> Option<f64> {
    observations
        .iter()
        .find(|(d, _)| d.year() == target.year() && d.month() == target.month())
        .map(|&(_, v)| v)
}

fn missing_month(target: NaiveDate) -> AppError {
    AppError::new(
        ErrorKind::DataSource,
        format!(
            "couldn't locate a CPI value for {}-{:02}.",
            target.year(),
            target.month()
        ),
    )
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

/// FRED encodes missing observations as `"."`.
fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
