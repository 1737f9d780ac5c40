//! Command-line parsing for the booking dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the ingest/aggregation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::SplitterKind;
use crate::logging::DEFAULT_LEVEL;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hotel", version, about = "Hotel booking CSV dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the dataset, print totals by country and date, and optionally export.
    Summary(SummaryArgs),
    /// Launch the interactive dashboard.
    Tui(TuiArgs),
}

/// Options shared by every command that loads the dataset.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// CSV location: an http(s) URL or a local path.
    /// Falls back to $HOTEL_DASH_SOURCE, then `data/hotel_bookings_1000.csv`.
    #[arg(short = 's', long)]
    pub source: Option<String>,

    /// How to split CSV lines into fields.
    #[arg(long, value_enum, default_value_t = SplitterKind::Naive)]
    pub splitter: SplitterKind,

    /// First arrival date to include (YYYY-MM-DD). Defaults to the earliest in the data.
    #[arg(long, value_parser = parse_date_arg)]
    pub from: Option<NaiveDate>,

    /// Last arrival date to include (YYYY-MM-DD). Defaults to the latest in the data.
    #[arg(long, value_parser = parse_date_arg)]
    pub to: Option<NaiveDate>,

    /// HTTP request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

#[derive(Debug, Args, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Show the top-N countries.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Export per-country totals to CSV.
    #[arg(long = "export-countries", value_name = "CSV")]
    pub export_countries: Option<PathBuf>,

    /// Export per-date totals to CSV.
    #[arg(long = "export-dates", value_name = "CSV")]
    pub export_dates: Option<PathBuf>,

    /// Export the full dashboard view to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (e.g. `info`, `debug`).
    #[arg(long, default_value = DEFAULT_LEVEL)]
    pub log_level: String,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Countries shown in the bar chart.
    #[arg(long, default_value_t = 12)]
    pub top: usize,

    /// Write logs to this file (the terminal is owned by the dashboard).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = DEFAULT_LEVEL)]
    pub log_level: String,
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{s}' (expected YYYY-MM-DD): {e}"))
}
