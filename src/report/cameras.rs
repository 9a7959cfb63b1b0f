//! Aggregations over the red-light camera dataset.
//!
//! A violation count that did not parse adds nothing to a total.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use serde::Serialize;

use crate::domain::{CameraDataset, CameraViolation, normalize_column_name};
use crate::error::PipelineError;
use crate::io::cameras::INTERSECTION_COLUMN;
use crate::report::weekday_names;

/// Totals per year for the red-light camera dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraYear {
    pub year: i32,
    pub total_violations: f64,
    pub active_cameras: usize,
}

/// What camera violations are grouped by for a ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraKey {
    Intersection,
    Camera,
}

/// Summed violations for one named group (intersection, camera, weekday).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolationTotal {
    pub name: String,
    pub total: f64,
}

/// Summed violations for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    pub year: i32,
    pub month: u32,
    pub total: f64,
}

/// Total violations and distinct active cameras per year, oldest first.
///
/// Rows whose violation count is not a number add nothing to the total but
/// still mark their camera active.
pub fn camera_years(set: &CameraDataset) -> Vec<CameraYear> {
    let mut totals: BTreeMap<i32, (f64, BTreeSet<&str>)> = BTreeMap::new();
    for rec in &set.records {
        let entry = totals.entry(rec.calendar.year).or_default();
        entry.0 += violations(rec);
        entry.1.insert(rec.camera_id.as_str());
    }
    totals
        .into_iter()
        .map(|(year, (total_violations, cameras))| CameraYear {
            year,
            total_violations,
            active_cameras: cameras.len(),
        })
        .collect()
}

/// The `n` groups with the most violations, or the fewest with `ascending`.
///
/// Ties are broken by name. Rows without a key (blank intersection or camera
/// id) are skipped. Ranking by intersection needs an `INTERSECTION` column.
pub fn camera_top_n(
    set: &CameraDataset,
    key: CameraKey,
    n: usize,
    ascending: bool,
) -> Result<Vec<ViolationTotal>, PipelineError> {
    if key == CameraKey::Intersection
        && !set
            .columns
            .iter()
            .any(|c| normalize_column_name(c) == INTERSECTION_COLUMN)
    {
        return Err(PipelineError::Schema {
            missing: vec![INTERSECTION_COLUMN.to_string()],
        });
    }

    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for rec in &set.records {
        let name = match key {
            CameraKey::Intersection => rec.intersection.as_deref(),
            CameraKey::Camera => Some(rec.camera_id.as_str()).filter(|id| !id.is_empty()),
        };
        if let Some(name) = name {
            *totals.entry(name).or_insert(0.0) += violations(rec);
        }
    }

    let mut ranked: Vec<ViolationTotal> = totals
        .into_iter()
        .map(|(name, total)| ViolationTotal {
            name: name.to_string(),
            total,
        })
        .collect();
    // BTreeMap order is by name, so a stable sort keeps ties alphabetical.
    if ascending {
        ranked.sort_by(|a, b| a.total.total_cmp(&b.total));
    } else {
        ranked.sort_by(|a, b| b.total.total_cmp(&a.total));
    }
    ranked.truncate(n);
    Ok(ranked)
}

/// Violations per calendar month from the first to the last month present.
///
/// Months inside that span with no rows are listed with a zero total.
pub fn monthly_violations(set: &CameraDataset) -> Vec<MonthTotal> {
    let mut totals: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for rec in &set.records {
        let date = rec.violation_date;
        *totals.entry((date.year(), date.month())).or_insert(0.0) += violations(rec);
    }

    let (Some(&first), Some(&last)) = (totals.keys().next(), totals.keys().next_back()) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let (mut year, mut month) = first;
    while (year, month) <= last {
        out.push(MonthTotal {
            year,
            month,
            total: totals.get(&(year, month)).copied().unwrap_or(0.0),
        });
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    out
}

/// Violations per weekday, Monday first. Every weekday is listed.
pub fn violations_by_weekday(set: &CameraDataset) -> Vec<ViolationTotal> {
    let mut out: Vec<ViolationTotal> = weekday_names()
        .into_iter()
        .map(|name| ViolationTotal { name, total: 0.0 })
        .collect();
    for rec in &set.records {
        if let Some(slot) = out.iter_mut().find(|t| t.name == rec.calendar.day_name) {
            slot.total += violations(rec);
        }
    }
    out
}

fn violations(rec: &CameraViolation) -> f64 {
    rec.violations.unwrap_or(0.0)
}
