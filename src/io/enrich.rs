//! Crash dataset enrichment.
//!
//! Loads the cached crash CSV and derives, per row: the parsed crash
//! timestamp, its calendar year, weekday name and month name, plus the seven
//! injury counts with missing cells read as zero.
//!
//! The whole load fails on the first bad timestamp; rows are never dropped, so
//! aggregate counts always cover the full file.

use std::path::Path;

use chrono::NaiveDateTime;
use log::debug;

use crate::domain::{CalendarFields, CrashRecord, EnrichedRecordSet, InjuryCounts, InjuryMeasure};
use crate::error::PipelineError;
use crate::io::ingest::{RawRecordSet, load_raw, parse_number};

pub const CRASH_DATE_COLUMN: &str = "CRASH_DATE";

/// `03/19/2025 02:30:00 PM`
pub const CRASH_DATE_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";
const CRASH_DATE_HINT: &str = "MM/DD/YYYY HH:MM:SS AM/PM";

/// Load and enrich the crash table at `path`.
pub fn load_enriched(path: &Path) -> Result<EnrichedRecordSet, PipelineError> {
    let raw = load_raw(path)?;
    enrich(raw)
}

/// Enrich an already loaded table.
pub fn enrich(raw: RawRecordSet) -> Result<EnrichedRecordSet, PipelineError> {
    let mut required = vec![CRASH_DATE_COLUMN];
    required.extend(InjuryMeasure::ALL.iter().map(|m| m.column()));
    raw.require_columns(&required)?;

    let mut records = Vec::with_capacity(raw.rows.len());
    for row in &raw.rows {
        let crash_date = parse_crash_date(raw.value(row, CRASH_DATE_COLUMN), row.line)?;

        let mut injuries = InjuryCounts::default();
        for measure in InjuryMeasure::ALL {
            let cell = raw.value(row, measure.column());
            let value = match parse_number(cell) {
                Ok(Some(v)) if v >= 0.0 => v,
                Ok(None) => 0.0,
                _ => {
                    return Err(PipelineError::InvalidMeasure {
                        line: row.line,
                        column: measure.column().to_string(),
                        value: cell.unwrap_or_default().to_string(),
                    });
                }
            };
            injuries.set(measure, value);
        }

        records.push(CrashRecord {
            line: row.line,
            cells: row.cells.clone(),
            crash_date,
            calendar: CalendarFields::from_date(crash_date.date()),
            injuries,
        });
    }

    debug!("enriched {} crash records", records.len());

    Ok(EnrichedRecordSet::new(raw.headers, records))
}

fn parse_crash_date(value: Option<&str>, line: u64) -> Result<NaiveDateTime, PipelineError> {
    let raw = value.unwrap_or_default();
    NaiveDateTime::parse_from_str(raw, CRASH_DATE_FORMAT).map_err(|_| PipelineError::TimestampParse {
        line,
        column: CRASH_DATE_COLUMN.to_string(),
        value: raw.to_string(),
        expected: CRASH_DATE_HINT,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeMap;
    use std::io::Write;

    use chrono::{NaiveDate, Timelike};

    use super::*;

    pub(crate) const HEADER: &str = "CRASH_RECORD_ID,CRASH_DATE,LIGHTING_CONDITION,CRASH_HOUR,INJURIES_TOTAL,INJURIES_FATAL,INJURIES_INCAPACITATING,INJURIES_NON_INCAPACITATING,INJURIES_REPORTED_NOT_EVIDENT,INJURIES_NO_INDICATION,INJURIES_UNKNOWN";

    pub(crate) fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    pub(crate) fn three_rows() -> String {
        format!(
            "{HEADER}\n\
             a1,03/19/2023 02:30:00 PM,DAYLIGHT,14,2,0,1,1,0,3,0\n\
             a2,07/04/2023 11:15:00 PM,DARKNESS,23,,0,0,0,0,1,0\n\
             a3,01/01/2024 12:05:00 AM,DARKNESS,0,1,1,0,0,0,0,0\n"
        )
    }

    #[test]
    fn known_timestamp_derives_calendar_fields() {
        let file = write_csv(&format!("{HEADER}\nx,03/19/2025 02:30:00 PM,DAYLIGHT,14,0,0,0,0,0,0,0\n"));
        let set = load_enriched(file.path()).unwrap();

        let rec = &set.records()[0];
        assert_eq!(rec.crash_date.date(), NaiveDate::from_ymd_opt(2025, 3, 19).unwrap());
        assert_eq!(rec.crash_date.hour(), 14);
        assert_eq!(rec.calendar.year, 2025);
        assert_eq!(rec.calendar.day_name, "Wednesday");
        assert_eq!(rec.calendar.month_name, "March");
    }

    #[test]
    fn end_to_end_three_rows() {
        let file = write_csv(&three_rows());
        let set = load_enriched(file.path()).unwrap();

        assert_eq!(set.len(), 3);

        let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
        for rec in set.records() {
            *by_year.entry(rec.year()).or_default() += 1;
        }
        assert_eq!(by_year, BTreeMap::from([(2023, 2), (2024, 1)]));

        assert_eq!(set.records()[1].injuries(InjuryMeasure::Total), 0.0);
        // Source cell is kept as delivered.
        assert_eq!(set.cell(&set.records()[1], "INJURIES_TOTAL"), Some(""));
        assert_eq!(set.cell(&set.records()[0], "LIGHTING_CONDITION"), Some("DAYLIGHT"));
    }

    #[test]
    fn missing_measures_are_zero_filled() {
        let file = write_csv(&format!("{HEADER}\nx,03/19/2025 02:30:00 PM,DAYLIGHT,14,,,,,,,\n"));
        let set = load_enriched(file.path()).unwrap();

        for rec in set.records() {
            for measure in InjuryMeasure::ALL {
                let v = rec.injuries(measure);
                assert!(v.is_finite() && v >= 0.0, "{measure:?} = {v}");
                assert_eq!(v, 0.0);
            }
        }
    }

    #[test]
    fn na_tokens_in_measures_are_zero_filled() {
        for token in crate::io::ingest::NA_TOKENS {
            let file = write_csv(&format!(
                "{HEADER}\nx,03/19/2025 02:30:00 PM,DAYLIGHT,14,{token},0,0,0,0,0,{token}\n"
            ));
            let set = load_enriched(file.path()).unwrap_or_else(|e| panic!("{token}: {e}"));
            let rec = &set.records()[0];
            assert_eq!(rec.injuries(InjuryMeasure::Total), 0.0, "{token}");
            assert_eq!(rec.injuries(InjuryMeasure::Unknown), 0.0, "{token}");
            assert_eq!(set.cell(rec, "INJURIES_TOTAL"), Some(token));
        }
    }

    #[test]
    fn quoted_text_cells_are_kept_verbatim() {
        let file = write_csv(&format!(
            "{HEADER}\nx,\" 03/19/2025 02:30:00 PM \",\" DAYLIGHT \",14,\" 2 \",0,0,0,0,0,0\n"
        ));
        let set = load_enriched(file.path()).unwrap();
        let rec = &set.records()[0];

        assert_eq!(set.cell(rec, "LIGHTING_CONDITION"), Some(" DAYLIGHT "));
        assert_eq!(rec.calendar.year, 2025);
        assert_eq!(rec.injuries(InjuryMeasure::Total), 2.0);
    }

    #[test]
    fn other_numeric_columns_are_untouched() {
        let file = write_csv(&format!("{HEADER}\nx,03/19/2025 02:30:00 PM,DAYLIGHT,,1,0,0,0,0,0,0\n"));
        let set = load_enriched(file.path()).unwrap();
        assert_eq!(set.cell(&set.records()[0], "CRASH_HOUR"), Some(""));
    }

    #[test]
    fn enrichment_is_deterministic() {
        let file = write_csv(&three_rows());
        let first = load_enriched(file.path()).unwrap();
        let second = load_enriched(file.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn wrong_timestamp_format_fails_the_load() {
        let file = write_csv(&format!(
            "{HEADER}\n\
             ok,03/19/2025 02:30:00 PM,DAYLIGHT,14,0,0,0,0,0,0,0\n\
             bad,2025-03-19,DAYLIGHT,14,0,0,0,0,0,0,0\n"
        ));
        match load_enriched(file.path()) {
            Err(PipelineError::TimestampParse { line, value, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(value, "2025-03-19");
            }
            other => panic!("expected timestamp error, got {other:?}"),
        }
    }

    #[test]
    fn empty_timestamp_fails_the_load() {
        let file = write_csv(&format!("{HEADER}\nx,,DAYLIGHT,14,0,0,0,0,0,0,0\n"));
        assert!(matches!(
            load_enriched(file.path()),
            Err(PipelineError::TimestampParse { .. })
        ));
    }

    #[test]
    fn missing_fatal_column_is_a_schema_error() {
        let header = HEADER.replace(",INJURIES_FATAL", "");
        let file = write_csv(&format!("{header}\nx,03/19/2025 02:30:00 PM,DAYLIGHT,14,0,0,0,0,0,0\n"));
        match load_enriched(file.path()) {
            Err(PipelineError::Schema { missing }) => assert_eq!(missing, vec!["INJURIES_FATAL"]),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_measure_is_rejected() {
        let file = write_csv(&format!("{HEADER}\nx,03/19/2025 02:30:00 PM,DAYLIGHT,14,two,0,0,0,0,0,0\n"));
        match load_enriched(file.path()) {
            Err(PipelineError::InvalidMeasure { column, value, .. }) => {
                assert_eq!(column, "INJURIES_TOTAL");
                assert_eq!(value, "two");
            }
            other => panic!("expected invalid measure, got {other:?}"),
        }
    }

    #[test]
    fn header_only_file_yields_empty_set() {
        let file = write_csv(&format!("{HEADER}\n"));
        let set = load_enriched(file.path()).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.columns().len(), 11);
    }
}
