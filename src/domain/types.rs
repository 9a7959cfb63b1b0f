//! Shared domain types.
//!
//! Record sets keep every source cell as delivered, next to the typed fields
//! derived from them. They are built once per load and handed to callers
//! read-only; nothing here is cached across loads.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One of the seven injury-count columns of the crash dataset.
///
/// A missing cell in any of these columns is read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjuryMeasure {
    Total,
    Fatal,
    Incapacitating,
    NonIncapacitating,
    ReportedNotEvident,
    NoIndication,
    Unknown,
}

impl InjuryMeasure {
    pub const ALL: [InjuryMeasure; 7] = [
        InjuryMeasure::Total,
        InjuryMeasure::Fatal,
        InjuryMeasure::Incapacitating,
        InjuryMeasure::NonIncapacitating,
        InjuryMeasure::ReportedNotEvident,
        InjuryMeasure::NoIndication,
        InjuryMeasure::Unknown,
    ];

    /// Source column name.
    pub fn column(self) -> &'static str {
        match self {
            InjuryMeasure::Total => "INJURIES_TOTAL",
            InjuryMeasure::Fatal => "INJURIES_FATAL",
            InjuryMeasure::Incapacitating => "INJURIES_INCAPACITATING",
            InjuryMeasure::NonIncapacitating => "INJURIES_NON_INCAPACITATING",
            InjuryMeasure::ReportedNotEvident => "INJURIES_REPORTED_NOT_EVIDENT",
            InjuryMeasure::NoIndication => "INJURIES_NO_INDICATION",
            InjuryMeasure::Unknown => "INJURIES_UNKNOWN",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            InjuryMeasure::Total => "Total",
            InjuryMeasure::Fatal => "Fatal",
            InjuryMeasure::Incapacitating => "Incapacitating",
            InjuryMeasure::NonIncapacitating => "Non-incapacitating",
            InjuryMeasure::ReportedNotEvident => "Reported, not evident",
            InjuryMeasure::NoIndication => "No indication",
            InjuryMeasure::Unknown => "Unknown",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Zero-filled injury counts for one crash, indexed by [`InjuryMeasure`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InjuryCounts([f64; 7]);

impl InjuryCounts {
    pub fn get(&self, measure: InjuryMeasure) -> f64 {
        self.0[measure.index()]
    }

    pub fn set(&mut self, measure: InjuryMeasure, value: f64) {
        self.0[measure.index()] = value;
    }
}

/// Calendar attributes derived from a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFields {
    pub year: i32,
    /// Full English weekday name, e.g. `Wednesday`.
    pub day_name: String,
    /// Full English month name, e.g. `March`.
    pub month_name: String,
}

impl CalendarFields {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            day_name: date.format("%A").to_string(),
            month_name: date.format("%B").to_string(),
        }
    }
}

/// One crash row: the source cells plus the derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CrashRecord {
    /// 1-based line number in the source file (header is line 1).
    pub line: u64,
    /// Source cells, aligned with [`EnrichedRecordSet::columns`].
    pub cells: Vec<String>,
    pub crash_date: NaiveDateTime,
    pub calendar: CalendarFields,
    pub injuries: InjuryCounts,
}

impl CrashRecord {
    pub fn year(&self) -> i32 {
        self.calendar.year
    }

    pub fn injuries(&self, measure: InjuryMeasure) -> f64 {
        self.injuries.get(measure)
    }
}

/// The crash table after enrichment.
///
/// Every record carries a valid timestamp and a value for each injury measure.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecordSet {
    columns: Vec<String>,
    records: Vec<CrashRecord>,
}

impl EnrichedRecordSet {
    pub fn new(columns: Vec<String>, records: Vec<CrashRecord>) -> Self {
        Self { columns, records }
    }

    /// Source header names, exactly as delivered.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[CrashRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of a source column, matched on its normalized name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = normalize_column_name(name);
        self.columns
            .iter()
            .position(|c| normalize_column_name(c) == wanted)
    }

    /// A source cell by column name; `None` if the column does not exist.
    pub fn cell<'a>(&self, record: &'a CrashRecord, column: &str) -> Option<&'a str> {
        let idx = self.column_index(column)?;
        record.cells.get(idx).map(String::as_str)
    }
}

/// One red-light camera row: the source cells plus the derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraViolation {
    pub line: u64,
    pub cells: Vec<String>,
    pub camera_id: String,
    /// `INTERSECTION` cell, when the column exists and the cell is not blank.
    pub intersection: Option<String>,
    pub violation_date: NaiveDate,
    /// `None` when the source value is not a number.
    pub violations: Option<f64>,
    pub calendar: CalendarFields,
}

/// The red-light camera table after enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraDataset {
    pub columns: Vec<String>,
    pub records: Vec<CameraViolation>,
}

/// Canonical form used to match header names: trimmed, BOM stripped,
/// upper-cased, inner spaces mapped to `_`.
pub fn normalize_column_name(name: &str) -> String {
    name.trim()
        .trim_start_matches('\u{feff}')
        .trim()
        .chars()
        .map(|c| if c == ' ' { '_' } else { c.to_ascii_uppercase() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_fields_use_full_english_names() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 19).unwrap();
        let cal = CalendarFields::from_date(date);
        assert_eq!(cal.year, 2025);
        assert_eq!(cal.day_name, "Wednesday");
        assert_eq!(cal.month_name, "March");
    }

    #[test]
    fn normalize_column_name_handles_bom_case_and_spaces() {
        assert_eq!(normalize_column_name("\u{feff}crash_date"), "CRASH_DATE");
        assert_eq!(normalize_column_name(" CAMERA ID "), "CAMERA_ID");
        assert_eq!(normalize_column_name("Injuries_Total"), "INJURIES_TOTAL");
    }

    #[test]
    fn injury_measures_cover_seven_distinct_columns() {
        let mut cols: Vec<&str> = InjuryMeasure::ALL.iter().map(|m| m.column()).collect();
        cols.sort_unstable();
        cols.dedup();
        assert_eq!(cols.len(), 7);
    }
}
