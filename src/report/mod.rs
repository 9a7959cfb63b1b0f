//! Aggregations over enriched record sets.
//!
//! Everything here reads an already loaded set; nothing re-fetches or
//! re-parses. Chart front-ends consume these values directly.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Timelike};
use serde::Serialize;

use crate::domain::{CalendarFields, CrashRecord, EnrichedRecordSet, InjuryMeasure};
use crate::error::PipelineError;
use crate::io::ingest::parse_number;

pub mod cameras;
pub mod filter;
pub mod format;

pub use cameras::*;
pub use filter::*;
pub use format::*;

pub const LIGHTING_CONDITION_COLUMN: &str = "LIGHTING_CONDITION";
pub const CRASH_HOUR_COLUMN: &str = "CRASH_HOUR";

/// Crash count for one year, with the change from the previous listed year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
    /// Percent change from the previous entry; `None` for the first year.
    /// Infinite when the previous count was zero and this one is not.
    pub change_pct: Option<f64>,
}

/// A named bucket (weekday or month) and its crash count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedCount {
    pub name: String,
    pub count: usize,
}

/// Mean, sample standard deviation and excess kurtosis of a measure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasureStats {
    pub measure: InjuryMeasure,
    pub n: usize,
    pub sum: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub excess_kurtosis: f64,
}

/// Everything the `summary` command reports for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrashSummary {
    pub filter: CrashFilter,
    pub rows_total: usize,
    pub rows_selected: usize,
    pub years: Vec<YearCount>,
    pub weekdays: Vec<NamedCount>,
    pub months: Vec<NamedCount>,
    pub injuries: Vec<MeasureStats>,
}

pub fn summarize(set: &EnrichedRecordSet, filter: &CrashFilter) -> CrashSummary {
    let selected = filter.select(set);
    CrashSummary {
        filter: *filter,
        rows_total: set.len(),
        rows_selected: selected.len(),
        years: year_trend(&selected),
        weekdays: weekday_counts(&selected),
        months: month_counts(&selected),
        injuries: InjuryMeasure::ALL
            .iter()
            .filter_map(|&m| measure_stats(&selected, m))
            .collect(),
    }
}

/// Crash counts per year, oldest first.
pub fn year_counts(records: &[&CrashRecord]) -> BTreeMap<i32, usize> {
    let mut out = BTreeMap::new();
    for rec in records {
        *out.entry(rec.year()).or_insert(0) += 1;
    }
    out
}

/// Year counts annotated with the percent change between consecutive years.
pub fn year_trend(records: &[&CrashRecord]) -> Vec<YearCount> {
    let mut out: Vec<YearCount> = Vec::new();
    for (year, count) in year_counts(records) {
        let change_pct = out.last().map(|prev| percent_change(prev.count, count));
        out.push(YearCount {
            year,
            count,
            change_pct,
        });
    }
    out
}

pub fn percent_change(old: usize, new: usize) -> f64 {
    if old == 0 {
        if new > 0 { f64::INFINITY } else { 0.0 }
    } else {
        (new as f64 - old as f64) / old as f64 * 100.0
    }
}

/// Crash counts per weekday, Monday first. Every weekday is listed.
pub fn weekday_counts(records: &[&CrashRecord]) -> Vec<NamedCount> {
    named_counts(weekday_names(), records.iter().map(|r| r.calendar.day_name.as_str()))
}

/// Crash counts per month, January first. Every month is listed.
pub fn month_counts(records: &[&CrashRecord]) -> Vec<NamedCount> {
    named_counts(month_names(), records.iter().map(|r| r.calendar.month_name.as_str()))
}

fn named_counts<'a>(names: Vec<String>, keys: impl Iterator<Item = &'a str>) -> Vec<NamedCount> {
    let mut counts = vec![0usize; names.len()];
    for key in keys {
        if let Some(idx) = names.iter().position(|n| n == key) {
            counts[idx] += 1;
        }
    }
    names
        .into_iter()
        .zip(counts)
        .map(|(name, count)| NamedCount { name, count })
        .collect()
}

/// Weekday names, Monday first, spelled as [`CalendarFields::day_name`].
pub fn weekday_names() -> Vec<String> {
    // 2024-01-01 is a Monday.
    (1..=7)
        .filter_map(|day| NaiveDate::from_ymd_opt(2024, 1, day))
        .map(|date| CalendarFields::from_date(date).day_name)
        .collect()
}

/// Month names, January first, spelled as [`CalendarFields::month_name`].
pub fn month_names() -> Vec<String> {
    (1..=12)
        .filter_map(|month| NaiveDate::from_ymd_opt(2024, month, 1))
        .map(|date| CalendarFields::from_date(date).month_name)
        .collect()
}

/// Summary statistics of one injury measure. `None` for an empty selection.
///
/// Standard deviation uses the `n - 1` denominator; kurtosis is the sample
/// excess kurtosis with the usual bias correction (needs `n >= 4`, otherwise
/// reported as `NaN`).
pub fn measure_stats(records: &[&CrashRecord], measure: InjuryMeasure) -> Option<MeasureStats> {
    if records.is_empty() {
        return None;
    }

    let values: Vec<f64> = records.iter().map(|r| r.injuries(measure)).collect();
    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    let mean = sum / n;

    let m2: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    let m4: f64 = values.iter().map(|v| (v - mean).powi(4)).sum();

    let std_dev = if values.len() > 1 { (m2 / (n - 1.0)).sqrt() } else { 0.0 };

    let excess_kurtosis = if values.len() >= 4 && m2 > 0.0 {
        let var = m2 / (n - 1.0);
        let a = n * (n + 1.0) / ((n - 1.0) * (n - 2.0) * (n - 3.0));
        let b = 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
        a * m4 / var.powi(2) - b
    } else {
        f64::NAN
    };

    Some(MeasureStats {
        measure,
        n: values.len(),
        sum,
        mean,
        std_dev,
        excess_kurtosis,
    })
}

/// `INJURIES_TOTAL` values of one lighting condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightingGroup {
    pub condition: String,
    pub values: Vec<f64>,
}

/// Total injuries per crash in `year`, grouped by `LIGHTING_CONDITION`.
///
/// Groups are sorted by condition name; crashes with a blank condition are
/// left out. With `log1p` each value `v` becomes `ln(1 + v)`, which spreads the
/// heavy pile of zero and one injury crashes.
pub fn injuries_by_lighting(
    set: &EnrichedRecordSet,
    year: i32,
    log1p: bool,
) -> Result<Vec<LightingGroup>, PipelineError> {
    if set.column_index(LIGHTING_CONDITION_COLUMN).is_none() {
        return Err(PipelineError::Schema {
            missing: vec![LIGHTING_CONDITION_COLUMN.to_string()],
        });
    }

    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for rec in set.records().iter().filter(|r| r.year() == year) {
        let Some(condition) = set
            .cell(rec, LIGHTING_CONDITION_COLUMN)
            .map(str::trim)
            .filter(|c| !c.is_empty())
        else {
            continue;
        };
        let total = rec.injuries(InjuryMeasure::Total);
        groups
            .entry(condition)
            .or_default()
            .push(if log1p { total.ln_1p() } else { total });
    }

    Ok(groups
        .into_iter()
        .map(|(condition, values)| LightingGroup {
            condition: condition.to_string(),
            values,
        })
        .collect())
}

/// One point of the crash-hour against injuries scatter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourInjury {
    pub hour: u32,
    pub injuries: f64,
}

/// `(CRASH_HOUR, INJURIES_TOTAL)` for every crash the filter selects, in
/// source order.
///
/// The hour comes from the `CRASH_HOUR` cell when it holds a whole number in
/// `0..=23`, otherwise from the parsed crash timestamp.
pub fn hour_injury_pairs(set: &EnrichedRecordSet, filter: &CrashFilter) -> Vec<HourInjury> {
    filter
        .select(set)
        .into_iter()
        .map(|rec| HourInjury {
            hour: crash_hour(set, rec),
            injuries: rec.injuries(InjuryMeasure::Total),
        })
        .collect()
}

fn crash_hour(set: &EnrichedRecordSet, rec: &CrashRecord) -> u32 {
    match parse_number(set.cell(rec, CRASH_HOUR_COLUMN)) {
        Ok(Some(h)) if h.fract() == 0.0 && (0.0..=23.0).contains(&h) => h as u32,
        _ => rec.crash_date.hour(),
    }
}
