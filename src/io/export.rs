//! Export the enriched crash table to CSV.
//!
//! The output keeps every source column in its original position, with the
//! injury columns replaced by their zero-filled values, followed by the
//! derived `CRASH_YEAR`, `CRASH_DAY_NAME` and `CRASH_MONTH_NAME` columns.

use std::fs::File;
use std::path::Path;

use crate::domain::{EnrichedRecordSet, InjuryMeasure};
use crate::error::AppError;

const DERIVED_COLUMNS: [&str; 3] = ["CRASH_YEAR", "CRASH_DAY_NAME", "CRASH_MONTH_NAME"];

/// Write the enriched table to a CSV file.
pub fn write_enriched_csv(path: &Path, set: &EnrichedRecordSet) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    let mut header: Vec<&str> = set.columns().iter().map(String::as_str).collect();
    header.extend(DERIVED_COLUMNS);
    writer
        .write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    let measure_positions: Vec<(usize, InjuryMeasure)> = InjuryMeasure::ALL
        .iter()
        .filter_map(|&m| set.column_index(m.column()).map(|idx| (idx, m)))
        .collect();

    for rec in set.records() {
        let mut row = rec.cells.clone();
        row.resize(set.columns().len(), String::new());
        for &(idx, measure) in &measure_positions {
            row[idx] = format_count(rec.injuries(measure));
        }
        row.push(rec.calendar.year.to_string());
        row.push(rec.calendar.day_name.clone());
        row.push(rec.calendar.month_name.clone());

        writer
            .write_record(&row)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

fn format_count(v: f64) -> String {
    if v.fract() == 0.0 { format!("{v:.0}") } else { v.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::enrich::load_enriched;
    use crate::io::enrich::tests::{three_rows, write_csv};

    #[test]
    fn export_appends_derived_columns_and_fills_measures() {
        let input = write_csv(&three_rows());
        let set = load_enriched(input.path()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("enriched.csv");
        write_enriched_csv(&out, &set).unwrap();

        let mut reader = csv::Reader::from_path(&out).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), set.columns().len() + 3);
        assert_eq!(&headers[headers.len() - 3], "CRASH_YEAR");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        // Second row had an empty INJURIES_TOTAL.
        assert_eq!(&rows[1][4], "0");
        assert_eq!(&rows[1][headers.len() - 3], "2023");
        assert_eq!(&rows[1][headers.len() - 2], "Tuesday");
        assert_eq!(&rows[1][headers.len() - 1], "July");
    }

    #[test]
    fn counts_print_without_trailing_fraction() {
        assert_eq!(format_count(3.0), "3");
        assert_eq!(format_count(0.5), "0.5");
    }
}
