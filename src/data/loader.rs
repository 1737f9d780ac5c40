//! Booking dataset loader.
//!
//! Fetches the CSV (HTTP(S) or local file), parses it, and reports the result
//! as a `LoadOutcome`. Loading never returns an error and never panics
//! outward: failures, empty datasets, and good data are distinct variants so
//! the front-ends can show the right state.

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{error, info, warn};

use crate::domain::{BookingRecord, SplitterKind};
use crate::error::AppError;
use crate::io::ingest::{DatasetError, ParsedBookings, parse_bookings, splitter_for};

/// Where the CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Http(String),
    File(PathBuf),
}

impl DataSource {
    /// `http://` and `https://` prefixes select HTTP; anything else is a path.
    pub fn parse(raw: &str) -> Self {
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DataSource::Http(raw.to_string())
        } else {
            DataSource::File(PathBuf::from(raw))
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Http(url) => write!(f, "{url}"),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Why a load produced nothing at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    /// The server answered with a non-success status.
    Status { url: String, status: u16 },
    /// The request could not be completed or the body could not be read.
    Transport { url: String, message: String },
    /// The local file could not be read.
    Io { path: PathBuf, message: String },
    /// A panic escaped the fetch or parse step.
    Unexpected(String),
}

impl std::fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadFailure::Status { url, status } => {
                write!(f, "Failed to load CSV data: {url} returned HTTP {status}")
            }
            LoadFailure::Transport { url, message } => {
                write!(f, "Failed to load CSV data from {url}: {message}")
            }
            LoadFailure::Io { path, message } => {
                write!(f, "Failed to read CSV '{}': {message}", path.display())
            }
            LoadFailure::Unexpected(message) => write!(f, "Error processing booking data: {message}"),
        }
    }
}

impl std::error::Error for LoadFailure {}

/// The dataset was read but yielded no bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// Header only (or nothing at all).
    NoDataRows,
    /// Data rows existed but every one was discarded.
    NoValidRows { rows_read: usize },
}

impl std::fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmptyReason::NoDataRows => write!(f, "CSV file has no data rows"),
            EmptyReason::NoValidRows { rows_read } => {
                write!(f, "none of the {rows_read} data rows passed validation")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Loaded(ParsedBookings),
    Empty(EmptyReason),
    Failed(LoadFailure),
}

impl LoadOutcome {
    /// Loaded records, or an empty slice for the other variants.
    pub fn records(&self) -> &[BookingRecord] {
        match self {
            LoadOutcome::Loaded(parsed) => &parsed.records,
            LoadOutcome::Empty(_) | LoadOutcome::Failed(_) => &[],
        }
    }

    pub fn into_records(self) -> Vec<BookingRecord> {
        match self {
            LoadOutcome::Loaded(parsed) => parsed.records,
            LoadOutcome::Empty(_) | LoadOutcome::Failed(_) => Vec::new(),
        }
    }
}

/// Fetches and parses one configured source.
#[derive(Debug, Clone)]
pub struct Loader {
    client: Client,
    source: DataSource,
    splitter: SplitterKind,
}

impl Loader {
    pub fn new(source: DataSource, splitter: SplitterKind, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::runtime(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            source,
            splitter,
        })
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Fetch and parse. Always returns an outcome.
    pub fn load(&self) -> LoadOutcome {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.load_inner()))
            .unwrap_or_else(|_| LoadOutcome::Failed(LoadFailure::Unexpected("panic while loading".to_string())));

        match &outcome {
            LoadOutcome::Loaded(parsed) => info!(
                source = %self.source,
                rows_used = parsed.rows_used(),
                rows_skipped = parsed.rows_skipped(),
                "loaded bookings"
            ),
            LoadOutcome::Empty(reason) => warn!(source = %self.source, %reason, "no booking data"),
            LoadOutcome::Failed(failure) => error!(source = %self.source, %failure, "booking load failed"),
        }
        outcome
    }

    /// Records only; every non-`Loaded` outcome becomes an empty vector.
    pub fn load_records(&self) -> Vec<BookingRecord> {
        self.load().into_records()
    }

    fn load_inner(&self) -> LoadOutcome {
        let text = match self.fetch_text() {
            Ok(text) => text,
            Err(failure) => return LoadOutcome::Failed(failure),
        };

        let splitter = splitter_for(self.splitter);
        match parse_bookings(&text, splitter.as_ref()) {
            Err(DatasetError::NoDataRows) => LoadOutcome::Empty(EmptyReason::NoDataRows),
            Ok(parsed) if parsed.records.is_empty() => LoadOutcome::Empty(EmptyReason::NoValidRows {
                rows_read: parsed.rows_read,
            }),
            Ok(parsed) => LoadOutcome::Loaded(parsed),
        }
    }

    fn fetch_text(&self) -> Result<String, LoadFailure> {
        match &self.source {
            DataSource::Http(url) => {
                let resp = self.client.get(url).send().map_err(|e| LoadFailure::Transport {
                    url: url.clone(),
                    message: e.to_string(),
                })?;

                if !resp.status().is_success() {
                    return Err(LoadFailure::Status {
                        url: url.clone(),
                        status: resp.status().as_u16(),
                    });
                }

                resp.text().map_err(|e| LoadFailure::Transport {
                    url: url.clone(),
                    message: format!("failed to read response body: {e}"),
                })
            }
            DataSource::File(path) => fs::read_to_string(path).map_err(|e| LoadFailure::Io {
                path: path.clone(),
                message: e.to_string(),
            }),
        }
    }
}

/// Issues load tickets so that only the newest load is applied.
///
/// A load that finishes after a newer one was started is stale and its
/// result is dropped (last-write-wins).
#[derive(Debug, Default)]
pub struct LoadSequencer {
    issued: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl LoadSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> LoadTicket {
        self.issued += 1;
        LoadTicket(self.issued)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.issued
    }

    /// Pass `value` through only if `ticket` is the newest one issued.
    pub fn accept<T>(&self, ticket: LoadTicket, value: T) -> Option<T> {
        self.is_current(ticket).then_some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    const CSV: &str = "hotel,arrival_date_year,arrival_date_month,arrival_date_day_of_month,adults,children,babies,country\n\
HotelA,2023,July,15,2,1,0,Portugal\n\
HotelB,2023,July,15,1,0,0,France\n";

    fn serve_once(status_line: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );

        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let mut request = Vec::new();
                loop {
                    let n = stream.read(&mut buf).unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                    if request.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let _ = stream.write_all(response.as_bytes());
            }
        });

        format!("http://{addr}/data/hotel_bookings_1000.csv")
    }

    fn loader(source: DataSource) -> Loader {
        Loader::new(source, SplitterKind::Naive, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn source_kind_from_prefix() {
        assert_eq!(
            DataSource::parse("HTTPS://example.com/a.csv"),
            DataSource::Http("HTTPS://example.com/a.csv".to_string())
        );
        assert_eq!(DataSource::parse("data/a.csv"), DataSource::File(PathBuf::from("data/a.csv")));
    }

    #[test]
    fn http_success_loads_records() {
        let url = serve_once("200 OK", CSV);
        let outcome = loader(DataSource::Http(url)).load();
        assert!(matches!(outcome, LoadOutcome::Loaded(_)));
        assert_eq!(outcome.records().len(), 2);
    }

    #[test]
    fn http_error_status_is_failed_not_panic() {
        let url = serve_once("404 Not Found", "missing");
        let outcome = loader(DataSource::Http(url.clone())).load();
        match outcome {
            LoadOutcome::Failed(LoadFailure::Status { status, url: failed }) => {
                assert_eq!(status, 404);
                assert_eq!(failed, url);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn http_error_status_gives_empty_records() {
        let url = serve_once("500 Internal Server Error", "");
        assert!(loader(DataSource::Http(url)).load_records().is_empty());
    }

    #[test]
    fn refused_connection_is_transport_failure() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let outcome = loader(DataSource::Http(format!("http://{addr}/x.csv"))).load();
        assert!(matches!(outcome, LoadOutcome::Failed(LoadFailure::Transport { .. })));
    }

    #[test]
    fn missing_file_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = loader(DataSource::File(dir.path().join("nope.csv"))).load();
        assert!(matches!(outcome, LoadOutcome::Failed(LoadFailure::Io { .. })));
        assert!(outcome.records().is_empty());
    }

    #[test]
    fn header_only_and_all_invalid_are_distinct_empties() {
        let dir = tempfile::tempdir().unwrap();

        let header_only = dir.path().join("header.csv");
        fs::write(&header_only, CSV.lines().next().unwrap()).unwrap();
        assert!(matches!(
            loader(DataSource::File(header_only)).load(),
            LoadOutcome::Empty(EmptyReason::NoDataRows)
        ));

        let invalid = dir.path().join("invalid.csv");
        fs::write(&invalid, "h\nH,1800,July,1,1,0,0,X\nH,2023,Jul,1,1,0,0,X\n").unwrap();
        assert!(matches!(
            loader(DataSource::File(invalid)).load(),
            LoadOutcome::Empty(EmptyReason::NoValidRows { rows_read: 2 })
        ));
    }

    #[test]
    fn file_source_uses_configured_splitter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quoted.csv");
        fs::write(&path, "h\n\"A, B\",2023,July,1,1,0,0,X\n").unwrap();

        let naive = Loader::new(DataSource::File(path.clone()), SplitterKind::Naive, Duration::from_secs(1)).unwrap();
        assert!(matches!(naive.load(), LoadOutcome::Empty(_)));

        let csv = Loader::new(DataSource::File(path), SplitterKind::Csv, Duration::from_secs(1)).unwrap();
        assert_eq!(csv.load_records().len(), 1);
    }

    #[test]
    fn sequencer_keeps_only_latest_ticket() {
        let mut seq = LoadSequencer::new();
        let first = seq.issue();
        let second = seq.issue();

        assert!(!seq.is_current(first));
        assert_eq!(seq.accept(first, "stale"), None);
        assert_eq!(seq.accept(second, "fresh"), Some("fresh"));
    }
}
