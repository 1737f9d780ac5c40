//! Booking CSV ingest and validation.
//!
//! This module turns raw CSV text into validated `BookingRecord`s.
//!
//! Design goals:
//! - **Row-level validation**: a bad line is skipped and reported, never fatal
//! - **Fixed column order**: the first 8 columns are positional, extras ignored
//! - **Pluggable splitting**: line-to-fields is behind `FieldSplitter`, so a
//!   quoting-aware reader can replace the naive comma split without touching
//!   validation or aggregation

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, info, warn};

use crate::domain::{BookingRecord, DAY_RANGE, RowErrorKind, SplitterKind, YEAR_RANGE, is_valid_month};

/// Number of positional columns a data line must provide.
pub const REQUIRED_FIELDS: usize = 8;

/// Splits one CSV line into raw fields.
pub trait FieldSplitter {
    fn split(&self, line: &str) -> Vec<String>;
}

/// Splits on every comma. Quotes are not interpreted, so a quoted field that
/// contains a comma shifts every later column.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveSplitter;

impl FieldSplitter for NaiveSplitter {
    fn split(&self, line: &str) -> Vec<String> {
        line.split(',').map(str::to_string).collect()
    }
}

/// Reads the line with the `csv` crate, honoring double-quoted fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSplitter;

impl FieldSplitter for CsvSplitter {
    fn split(&self, line: &str) -> Vec<String> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(line.as_bytes());

        let mut record = csv::StringRecord::new();
        match reader.read_record(&mut record) {
            Ok(true) => record.iter().map(str::to_string).collect(),
            Ok(false) => Vec::new(),
            Err(e) => {
                debug!(error = %e, "csv splitter rejected line");
                Vec::new()
            }
        }
    }
}

pub fn splitter_for(kind: SplitterKind) -> Box<dyn FieldSplitter + Send + Sync> {
    match kind {
        SplitterKind::Naive => Box::new(NaiveSplitter),
        SplitterKind::Csv => Box::new(CsvSplitter),
    }
}

/// A discarded input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based position among the non-empty lines (the header is line 1).
    pub line: usize,
    pub kind: RowErrorKind,
    pub message: String,
}

/// The dataset as a whole could not be read as bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetError {
    /// Nothing after the header row.
    NoDataRows,
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::NoDataRows => write!(f, "CSV file has no data rows"),
        }
    }
}

impl std::error::Error for DatasetError {}

/// Parser output: valid records in input order plus the lines that were dropped.
#[derive(Debug, Clone, Default)]
pub struct ParsedBookings {
    pub records: Vec<BookingRecord>,
    pub row_errors: Vec<RowError>,
    /// Data lines seen (header excluded).
    pub rows_read: usize,
}

impl ParsedBookings {
    pub fn rows_used(&self) -> usize {
        self.records.len()
    }

    pub fn rows_skipped(&self) -> usize {
        self.row_errors.len()
    }

    pub fn skipped_by_kind(&self) -> BTreeMap<RowErrorKind, usize> {
        let mut counts = BTreeMap::new();
        for err in &self.row_errors {
            *counts.entry(err.kind).or_insert(0) += 1;
        }
        counts
    }
}

/// Parse booking CSV text.
///
/// Fails only when the text has no data row after the header. Every other
/// problem is confined to its line and shows up in `row_errors`.
pub fn parse_bookings(text: &str, splitter: &dyn FieldSplitter) -> Result<ParsedBookings, DatasetError> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() < 2 {
        warn!(non_empty_lines = lines.len(), "CSV file has no data rows");
        return Err(DatasetError::NoDataRows);
    }

    let mut records = Vec::new();
    let mut row_errors = Vec::new();

    for (idx, line) in lines.iter().enumerate().skip(1) {
        let line_no = idx + 1;

        // A panicking splitter must not take the whole batch down with it.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| parse_line(line, splitter)));

        let (kind, message) = match outcome {
            Ok(Ok(record)) => {
                records.push(record);
                continue;
            }
            Ok(Err(rejected)) => rejected,
            Err(payload) => (RowErrorKind::Unexpected, panic_message(payload.as_ref())),
        };

        if kind == RowErrorKind::Unexpected {
            warn!(line = line_no, %message, "error processing line");
        } else {
            debug!(line = line_no, %kind, %message, "discarded row");
        }
        row_errors.push(RowError {
            line: line_no,
            kind,
            message,
        });
    }

    let parsed = ParsedBookings {
        records,
        row_errors,
        rows_read: lines.len() - 1,
    };
    info!(
        rows_read = parsed.rows_read,
        rows_used = parsed.rows_used(),
        rows_skipped = parsed.rows_skipped(),
        "parsed booking CSV"
    );
    Ok(parsed)
}

/// Parse with the naive splitter and absorb every failure into an empty result.
pub fn parse_records(text: &str) -> Vec<BookingRecord> {
    parse_bookings(text, &NaiveSplitter)
        .map(|parsed| parsed.records)
        .unwrap_or_default()
}

fn parse_line(line: &str, splitter: &dyn FieldSplitter) -> Result<BookingRecord, (RowErrorKind, String)> {
    let fields: Vec<String> = splitter
        .split(line)
        .into_iter()
        .take(REQUIRED_FIELDS)
        .map(|field| field.trim().to_string())
        .collect();

    let [hotel, year, month, day, adults, children, babies, country] = <[String; REQUIRED_FIELDS]>::try_from(fields)
        .map_err(|fields| {
            (
                RowErrorKind::TooFewFields,
                format!("Invalid line format: expected {REQUIRED_FIELDS} fields, found {}", fields.len()),
            )
        })?;

    let year = parse_year(&year)?;
    if !is_valid_month(&month) {
        return Err((RowErrorKind::InvalidMonth, format!("Unknown month name '{month}'.")));
    }
    let day = parse_day(&day)?;

    BookingRecord::new(
        &hotel,
        year,
        &month,
        day,
        parse_count(&adults),
        parse_count(&children),
        parse_count(&babies),
        &country,
    )
    .map_err(|kind| (kind, format!("Rejected record: {kind}.")))
}

fn parse_year(s: &str) -> Result<i32, (RowErrorKind, String)> {
    s.parse::<i32>()
        .ok()
        .filter(|y| YEAR_RANGE.contains(y))
        .ok_or_else(|| {
            (
                RowErrorKind::InvalidYear,
                format!(
                    "Invalid year '{s}' (expected an integer in {}..={}).",
                    YEAR_RANGE.start(),
                    YEAR_RANGE.end()
                ),
            )
        })
}

fn parse_day(s: &str) -> Result<u32, (RowErrorKind, String)> {
    s.parse::<u32>()
        .ok()
        .filter(|d| DAY_RANGE.contains(d))
        .ok_or_else(|| {
            (
                RowErrorKind::InvalidDay,
                format!(
                    "Invalid day '{s}' (expected an integer in {}..={}).",
                    DAY_RANGE.start(),
                    DAY_RANGE.end()
                ),
            )
        })
}

/// Guest counts never reject a row; anything unparsable counts as zero.
fn parse_count(s: &str) -> u32 {
    s.parse::<u32>().unwrap_or(0)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("Error processing line: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("Error processing line: {s}")
    } else {
        "Error processing line".to_string()
    }
}
