//! CSV ingest for the state and county datasets.
//!
//! This module turns the two NYT-format CSVs into an in-memory `Dataset` that
//! the rest of the pipeline treats as read-only.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden state, no reordering at ingest)
//! - **Separation of concerns**: no series logic here
//!
//! Dates are validated positionally: `YYYY-MM-DD` with 4/2/2 digit groups in
//! exactly those positions. A row whose date does not match is skipped and
//! recorded as a `RowError`, never a fatal error.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{CaseRecord, Dataset};
use crate::error::AppError;

/// Which of the two tables a reader is parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// `date, state, fips, cases, deaths`
    States,
    /// `date, county, state, fips, cases, deaths`
    Counties,
}

impl TableKind {
    fn required_columns(self) -> &'static [&'static str] {
        match self {
            TableKind::States => &["date", "state", "cases", "deaths"],
            TableKind::Counties => &["date", "county", "state", "cases", "deaths"],
        }
    }

    fn label(self) -> &'static str {
        match self {
            TableKind::States => "states",
            TableKind::Counties => "counties",
        }
    }
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    /// Which table the row came from.
    pub table: &'static str,
    /// 1-based CSV line number (header is line 1).
    pub line: usize,
    pub message: String,
}

/// Ingest output: the dataset plus bookkeeping about what was read.
#[derive(Debug, Clone)]
pub struct IngestedDataset {
    pub dataset: Dataset,
    pub rows_read: usize,
    pub rows_used: usize,
    pub row_errors: Vec<RowError>,
}

/// Load both dataset CSVs.
///
/// Missing files are fatal configuration errors; zero usable rows across both
/// tables is fatal with exit code 3. Individual bad rows are skipped and
/// reported in `row_errors`.
pub fn load_dataset(states_path: &Path, counties_path: &Path) -> Result<IngestedDataset, AppError> {
    let states_file = open_table(states_path)?;
    let counties_file = open_table(counties_path)?;

    let states = read_table(states_file, TableKind::States)?;
    let counties = read_table(counties_file, TableKind::Counties)?;

    let rows_read = states.rows_read + counties.rows_read;
    let mut row_errors = states.row_errors;
    row_errors.extend(counties.row_errors);

    let dataset = Dataset {
        states: states.records,
        counties: counties.records,
    };
    let rows_used = dataset.states.len() + dataset.counties.len();

    if rows_used == 0 {
        return Err(AppError::no_data(
            "No valid rows remain after ingest; check the dataset files.",
        ));
    }

    Ok(IngestedDataset {
        dataset,
        rows_read,
        rows_used,
        row_errors,
    })
}

fn open_table(path: &Path) -> Result<File, AppError> {
    File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open dataset '{}': {e}", path.display())))
}

/// One parsed table plus its bookkeeping.
#[derive(Debug, Clone)]
pub struct TableData {
    pub records: Vec<CaseRecord>,
    pub rows_read: usize,
    pub row_errors: Vec<RowError>,
}

/// Parse one table from any reader; kept generic so tests can feed strings.
pub fn read_table(reader: impl Read, kind: TableKind) -> Result<TableData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| {
            AppError::config(format!(
                "Failed to read {} CSV headers: {e}",
                kind.label()
            ))
        })?
        .clone();

    let header_map = build_header_map(&headers);
    for column in kind.required_columns() {
        if !header_map.contains_key(*column) {
            return Err(AppError::config(format!(
                "Missing required column `{column}` in {} CSV.",
                kind.label()
            )));
        }
    }

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    table: kind.label(),
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map, kind) {
            Ok(row) => records.push(row),
            Err(message) => row_errors.push(RowError {
                table: kind.label(),
                line,
                message,
            }),
        }
    }

    Ok(TableData {
        records,
        rows_read,
        row_errors,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿date"). If we don't strip it, schema validation
    // will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    kind: TableKind,
) -> Result<CaseRecord, String> {
    let field = |name: &str| header_map.get(name).and_then(|&i| record.get(i));

    let date_raw = field("date").unwrap_or("");
    let date =
        parse_positional_date(date_raw).ok_or_else(|| format!("Invalid date '{date_raw}'"))?;

    let state = field("state").unwrap_or("").to_string();
    if state.is_empty() {
        return Err("Empty `state` field".to_string());
    }

    let county = match kind {
        TableKind::States => None,
        TableKind::Counties => {
            let county = field("county").unwrap_or("");
            if county.is_empty() {
                return Err("Empty `county` field".to_string());
            }
            Some(county.to_string())
        }
    };

    let cases = parse_count(field("cases"), "cases")?;
    let deaths = parse_count(field("deaths"), "deaths")?;
    let fips = field("fips").unwrap_or("").to_string();

    Ok(CaseRecord {
        date,
        state,
        county,
        fips,
        cases,
        deaths,
    })
}

fn parse_count(raw: Option<&str>, column: &str) -> Result<u64, String> {
    let raw = raw.unwrap_or("");
    raw.parse::<u64>()
        .map_err(|_| format!("Invalid `{column}` value '{raw}'"))
}

/// Parse a date by fixed positional offsets: `YYYY-MM-DD`, exactly 10 bytes,
/// with all-digit 4/2/2 groups. Anything else is rejected.
pub fn parse_positional_date(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);
    if !digits(0..4) || !digits(5..7) || !digits(8..10) {
        return None;
    }

    // Slices are guaranteed ASCII digits, so the parses cannot fail.
    let year: i32 = raw[0..4].parse().ok()?;
    let month: u32 = raw[5..7].parse().ok()?;
    let day: u32 = raw[8..10].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_date_accepts_iso_only() {
        let date = parse_positional_date("2020-03-15").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2020, 3, 15).unwrap());

        assert!(parse_positional_date("2020-3-15").is_none());
        assert!(parse_positional_date("15/03/2020").is_none());
        assert!(parse_positional_date("2020-03-15T00").is_none());
        assert!(parse_positional_date("2020_03_15").is_none());
        assert!(parse_positional_date("").is_none());
        // Digit groups in the right place, but not a calendar day.
        assert!(parse_positional_date("2020-13-01").is_none());
    }

    #[test]
    fn state_table_parses_and_skips_bad_rows() {
        let csv = "\
date,state,fips,cases,deaths
2020-03-01,California,06,10,0
bad-date,California,06,11,0
2020-03-02,California,06,not-a-number,0
2020-03-03,California,06,20,1
";
        let table = read_table(csv.as_bytes(), TableKind::States).unwrap();
        assert_eq!(table.rows_read, 4);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.row_errors.len(), 2);
        assert_eq!(table.row_errors[0].line, 3);
        assert_eq!(table.records[1].cases, 20);
        assert_eq!(table.records[1].deaths, 1);
        assert!(table.records[0].county.is_none());
    }

    #[test]
    fn county_table_requires_the_county_column() {
        let csv = "date,state,fips,cases,deaths\n2020-03-01,California,06,10,0\n";
        let err = read_table(csv.as_bytes(), TableKind::Counties).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn county_rows_carry_both_names() {
        let csv = "\
date,county,state,fips,cases,deaths
2020-03-01,Alder,Avalon,06001,5,0
";
        let table = read_table(csv.as_bytes(), TableKind::Counties).unwrap();
        assert_eq!(table.records[0].state, "Avalon");
        assert_eq!(table.records[0].county.as_deref(), Some("Alder"));
        assert_eq!(table.records[0].fips, "06001");
    }

    #[test]
    fn bom_prefixed_header_is_normalized() {
        let csv = "\u{feff}date,state,fips,cases,deaths\n2020-03-01,Avalon,,1,0\n";
        let table = read_table(csv.as_bytes(), TableKind::States).unwrap();
        assert_eq!(table.records.len(), 1);
    }
}
