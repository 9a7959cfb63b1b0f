//! In-memory selection over a loaded crash table.
//!
//! Interactive front-ends load the table once and re-run a filter on every
//! control change (year selector, minimum-injury slider).

use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::{CrashRecord, EnrichedRecordSet, InjuryMeasure};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CrashFilter {
    /// Keep only crashes in this calendar year.
    pub year: Option<i32>,
    /// Keep only crashes with at least this many total injuries.
    pub min_injuries: Option<f64>,
}

impl CrashFilter {
    pub fn matches(&self, rec: &CrashRecord) -> bool {
        if let Some(year) = self.year {
            if rec.year() != year {
                return false;
            }
        }
        if let Some(min) = self.min_injuries {
            if rec.injuries(InjuryMeasure::Total) < min {
                return false;
            }
        }
        true
    }

    /// Matching records, in source order.
    pub fn select<'a>(&self, set: &'a EnrichedRecordSet) -> Vec<&'a CrashRecord> {
        set.records().iter().filter(|r| self.matches(r)).collect()
    }
}

/// Years present in the set, newest first.
pub fn distinct_years(set: &EnrichedRecordSet) -> Vec<i32> {
    let years: BTreeSet<i32> = set.records().iter().map(CrashRecord::year).collect();
    years.into_iter().rev().collect()
}
