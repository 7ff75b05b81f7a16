//! Merge the two daily series and resample to weekly means.
//!
//! The merge is a date join with a configurable mode (outer by default, since
//! the two assets may trade on different calendar days). The resample buckets
//! daily rows into Monday-ending weeks and takes the arithmetic mean of each
//! asset's close within the bucket, rounded to 2dp. Buckets with zero
//! observations for an asset stay empty (`None`) rather than being filled.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};

use crate::domain::{AlignedWeeklyTable, JoinMode, PriceSeries, WeeklyRow};
use crate::math::round_dp;

/// One merged daily row prior to resampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedRow {
    pub date: NaiveDate,
    pub close_a: Option<f64>,
    pub close_b: Option<f64>,
}

/// Monday-convention week-ending label (right-closed buckets).
///
/// A Monday labels its own bucket; every other weekday rolls forward to the
/// next Monday. This matches the `W-MON` resampling rule the rest of the
/// pipeline assumes.
pub fn week_ending(date: NaiveDate) -> NaiveDate {
    let days_ahead = (7 - date.weekday().num_days_from_monday()) % 7;
    date + Days::new(u64::from(days_ahead))
}

/// Join the two daily series on date.
///
/// Rows come out in chronological order; a side missing that date under the
/// chosen join mode is `None`.
pub fn merge_daily(a: &PriceSeries, b: &PriceSeries, join: JoinMode) -> Vec<MergedRow> {
    let map_a: BTreeMap<NaiveDate, f64> = a.points.iter().map(|p| (p.date, p.close)).collect();
    let map_b: BTreeMap<NaiveDate, f64> = b.points.iter().map(|p| (p.date, p.close)).collect();

    let mut dates: Vec<NaiveDate> = match join {
        JoinMode::Outer => map_a.keys().chain(map_b.keys()).copied().collect(),
        JoinMode::Inner => map_a.keys().filter(|d| map_b.contains_key(d)).copied().collect(),
        JoinMode::Left => map_a.keys().copied().collect(),
        JoinMode::Right => map_b.keys().copied().collect(),
    };
    dates.sort();
    dates.dedup();

    dates
        .into_iter()
        .map(|date| MergedRow {
            date,
            close_a: map_a.get(&date).copied(),
            close_b: map_b.get(&date).copied(),
        })
        .collect()
}

/// Merge and resample into the canonical aligned weekly table.
///
/// Emits one row per Monday-ending week from the first to the last merged
/// date inclusive, so interior weeks with no trading days still appear
/// (empty). Applying this to an already-weekly table is a no-op modulo
/// rounding.
pub fn aggregate_weekly(a: &PriceSeries, b: &PriceSeries, join: JoinMode) -> AlignedWeeklyTable {
    let merged = merge_daily(a, b, join);

    let mut table = AlignedWeeklyTable {
        asset_a: a.asset.clone(),
        asset_b: b.asset.clone(),
        rows: Vec::new(),
    };
    let (Some(first), Some(last)) = (merged.first(), merged.last()) else {
        return table;
    };

    // Bucket sums per week, per side.
    let mut buckets: BTreeMap<NaiveDate, (MeanAcc, MeanAcc)> = BTreeMap::new();
    for row in &merged {
        let entry = buckets.entry(week_ending(row.date)).or_default();
        entry.0.push(row.close_a);
        entry.1.push(row.close_b);
    }

    let mut week = week_ending(first.date);
    let last_week = week_ending(last.date);
    while week <= last_week {
        let (acc_a, acc_b) = buckets.get(&week).copied().unwrap_or_default();
        table.rows.push(WeeklyRow {
            week_ending: week,
            close_a: acc_a.mean().map(|m| round_dp(m, 2)),
            close_b: acc_b.mean().map(|m| round_dp(m, 2)),
        });
        week = week + Days::new(7);
    }

    table
}

#[derive(Debug, Clone, Copy, Default)]
struct MeanAcc {
    sum: f64,
    n: usize,
}

impl MeanAcc {
    fn push(&mut self, v: Option<f64>) {
        if let Some(v) = v {
            self.sum += v;
            self.n += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        if self.n == 0 {
            None
        } else {
            Some(self.sum / self.n as f64)
        }
    }
}
