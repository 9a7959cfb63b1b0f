//! Red-light camera violations dataset.
//!
//! Same shape of pipeline as the crash table, with looser rules for the
//! measure: a `VIOLATIONS` cell that is not a number becomes `None` instead of
//! failing the load. Dates are still strict.

use std::path::Path;

use chrono::NaiveDate;

use crate::domain::{CalendarFields, CameraDataset, CameraViolation};
use crate::error::PipelineError;
use crate::io::ingest::{load_raw, parse_number};

pub const CAMERA_ID_COLUMN: &str = "CAMERA_ID";
pub const VIOLATION_DATE_COLUMN: &str = "VIOLATION_DATE";
pub const VIOLATIONS_COLUMN: &str = "VIOLATIONS";
pub const INTERSECTION_COLUMN: &str = "INTERSECTION";

pub const VIOLATION_DATE_FORMAT: &str = "%m/%d/%Y";

pub fn load_camera_violations(path: &Path) -> Result<CameraDataset, PipelineError> {
    let raw = load_raw(path)?;
    raw.require_columns(&[CAMERA_ID_COLUMN, VIOLATION_DATE_COLUMN, VIOLATIONS_COLUMN])?;

    let mut records = Vec::with_capacity(raw.rows.len());
    for row in &raw.rows {
        let date_raw = raw.value(row, VIOLATION_DATE_COLUMN).unwrap_or_default();
        let violation_date = NaiveDate::parse_from_str(date_raw, VIOLATION_DATE_FORMAT).map_err(|_| {
            PipelineError::TimestampParse {
                line: row.line,
                column: VIOLATION_DATE_COLUMN.to_string(),
                value: date_raw.to_string(),
                expected: "MM/DD/YYYY",
            }
        })?;

        let violations = parse_number(raw.value(row, VIOLATIONS_COLUMN)).ok().flatten();

        records.push(CameraViolation {
            line: row.line,
            cells: row.cells.clone(),
            camera_id: raw.value(row, CAMERA_ID_COLUMN).unwrap_or_default().to_string(),
            intersection: raw.value(row, INTERSECTION_COLUMN).map(str::to_string),
            violation_date,
            violations,
            calendar: CalendarFields::from_date(violation_date),
        });
    }

    Ok(CameraDataset {
        columns: raw.headers,
        records,
    })
}
