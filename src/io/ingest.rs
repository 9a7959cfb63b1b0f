//! CSV ingest and schema validation.
//!
//! Turns a cached CSV file into a [`RawRecordSet`]: the header row plus every
//! data row. Headers are trimmed; data cells are kept exactly as delivered and
//! only trimmed when read through [`RawRecordSet::value`]. No typing happens
//! here; the enrichment step decides what each column means.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use log::debug;

use crate::domain::normalize_column_name;
use crate::error::PipelineError;

/// The table as loaded from disk, before enrichment.
#[derive(Debug, Clone)]
pub struct RawRecordSet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    header_map: HashMap<String, usize>,
}

#[derive(Debug, Clone)]
pub struct RawRow {
    /// 1-based line number (header is line 1).
    pub line: u64,
    pub cells: Vec<String>,
}

impl RawRecordSet {
    /// Fail with a schema error listing every name in `required` that has no
    /// matching column.
    pub fn require_columns(&self, required: &[&str]) -> Result<(), PipelineError> {
        let missing: Vec<String> = required
            .iter()
            .filter(|name| self.index_of(name).is_none())
            .map(|name| name.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::Schema { missing })
        }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.header_map.get(&normalize_column_name(name)).copied()
    }

    /// The trimmed, non-empty cell for `column`, if the column exists and the
    /// row has a value.
    pub fn value<'a>(&self, row: &'a RawRow, column: &str) -> Option<&'a str> {
        let idx = self.index_of(column)?;
        row.cells
            .get(idx)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

/// Read a CSV file into a [`RawRecordSet`].
///
/// Rows shorter than the header are padded with empty cells so every row lines
/// up with the header.
pub fn load_raw(path: &Path) -> Result<RawRecordSet, PipelineError> {
    let file = File::open(path).map_err(|source| PipelineError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(file);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let header_map = build_header_map(&headers);

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
        if cells.len() < headers.len() {
            cells.resize(headers.len(), String::new());
        }
        rows.push(RawRow { line, cells });
    }

    debug!(
        "loaded {} rows x {} columns from {}",
        rows.len(),
        headers.len(),
        path.display()
    );

    Ok(RawRecordSet {
        headers,
        rows,
        header_map,
    })
}

fn build_header_map(headers: &[String]) -> HashMap<String, usize> {
    let mut map = HashMap::with_capacity(headers.len());
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins on duplicate names.
        map.entry(normalize_column_name(name)).or_insert(idx);
    }
    map
}

/// Cell values read as missing, on top of the empty cell.
pub const NA_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>", "N/A",
    "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_na_token(s: &str) -> bool {
    NA_TOKENS.contains(&s)
}

/// Parse an optional numeric cell. `Ok(None)` for an empty cell or an NA token.
pub(crate) fn parse_number(raw: Option<&str>) -> Result<Option<f64>, ()> {
    let Some(s) = raw.map(str::trim) else { return Ok(None) };
    if s.is_empty() || is_na_token(s) {
        return Ok(None);
    }
    let v = s.replace(',', "").parse::<f64>().map_err(|_| ())?;
    if v.is_finite() { Ok(Some(v)) } else { Err(()) }
}
