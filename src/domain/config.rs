//! Resolved run configuration.
//!
//! CLI arguments are converted into a `DashConfig` once (see
//! `app::base_config_from_args`) so the loader, the summary, and the TUI all
//! read the same values.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::data::DataSource;

/// Dataset location used when neither `--source` nor the environment sets one.
pub const DEFAULT_SOURCE: &str = "data/hotel_bookings_1000.csv";

/// Environment variable consulted for the dataset location (`.env` is honored).
pub const SOURCE_ENV: &str = "HOTEL_DASH_SOURCE";

/// How a CSV line is split into fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SplitterKind {
    /// Split on every comma. No quoting support.
    Naive,
    /// Parse each line as RFC 4180 CSV (quoted fields may contain commas).
    Csv,
}

#[derive(Debug, Clone)]
pub struct DashConfig {
    pub source: DataSource,
    pub splitter: SplitterKind,
    /// Inclusive lower bound; `None` means the earliest arrival in the data.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound; `None` means the latest arrival in the data.
    pub to: Option<NaiveDate>,
    pub top_n: usize,
    pub timeout: Duration,
    pub export_countries: Option<PathBuf>,
    pub export_dates: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

/// Pick the dataset location: explicit argument, then environment, then default.
pub fn resolve_source(arg: Option<&str>) -> DataSource {
    dotenvy::dotenv().ok();
    resolve_source_from(arg, std::env::var(SOURCE_ENV).ok())
}

pub fn resolve_source_from(arg: Option<&str>, env: Option<String>) -> DataSource {
    let raw = arg
        .map(str::to_string)
        .filter(|s| !s.trim().is_empty())
        .or_else(|| env.filter(|s| !s.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string());
    DataSource::parse(raw.trim())
}
