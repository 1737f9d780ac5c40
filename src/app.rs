//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the run configuration
//! - loads and aggregates the booking dataset
//! - prints the summary or hands over to the TUI
//! - writes optional exports

use std::time::Duration;

use clap::Parser;

use crate::cli::{Command, SourceArgs, SummaryArgs, TuiArgs};
use crate::dashboard::{DashboardView, resolve_range};
use crate::data::{LoadOutcome, Loader};
use crate::domain::{DashConfig, resolve_source};
use crate::error::{AppError, EXIT_NO_DATA};
use crate::logging::{self, LogTarget};

/// Entry point for the `hotel` binary.
pub fn run() -> Result<(), AppError> {
    // `hotel` and `hotel --source x.csv` behave like `hotel tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Summary(args) => handle_summary(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_summary(args: SummaryArgs) -> Result<(), AppError> {
    logging::init(&args.log_level, LogTarget::Stderr)?;
    let config = summary_config_from_args(&args);

    let loader = Loader::new(config.source.clone(), config.splitter, config.timeout)?;
    let parsed = match loader.load() {
        LoadOutcome::Loaded(parsed) => parsed,
        LoadOutcome::Empty(reason) => {
            return Err(AppError::new(
                EXIT_NO_DATA,
                crate::report::format_empty(&config.source, &reason),
            ));
        }
        LoadOutcome::Failed(failure) => {
            return Err(AppError::runtime(crate::report::format_failure(&failure)));
        }
    };

    let range = resolve_range(&parsed.records, config.from, config.to)
        .ok_or_else(|| AppError::new(EXIT_NO_DATA, "No booking data available."))?;
    let view = DashboardView::derive(&parsed.records, &range);

    println!(
        "{}",
        crate::report::format_summary(&config.source, &parsed, &view, config.top_n)
    );

    // Optional exports.
    if let Some(path) = &config.export_countries {
        crate::io::export::write_countries_csv(path, &view.by_country)?;
    }
    if let Some(path) = &config.export_dates {
        crate::io::export::write_dates_csv(path, &view.by_date)?;
    }
    if let Some(path) = &config.export_json {
        crate::io::export::write_view_json(path, &view)?;
    }

    Ok(())
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    let target = match &args.log_file {
        Some(path) => LogTarget::File(path.clone()),
        None => LogTarget::Off,
    };
    logging::init(&args.log_level, target)?;

    let config = base_config_from_args(&args.source, args.top);
    crate::tui::run(config)
}

pub fn summary_config_from_args(args: &SummaryArgs) -> DashConfig {
    DashConfig {
        export_countries: args.export_countries.clone(),
        export_dates: args.export_dates.clone(),
        export_json: args.export_json.clone(),
        ..base_config_from_args(&args.source, args.top)
    }
}

pub fn base_config_from_args(args: &SourceArgs, top_n: usize) -> DashConfig {
    DashConfig {
        source: resolve_source(args.source.as_deref()),
        splitter: args.splitter,
        from: args.from,
        to: args.to,
        top_n,
        timeout: Duration::from_secs(args.timeout_secs.max(1)),
        export_countries: None,
        export_dates: None,
        export_json: None,
    }
}

/// Rewrite argv so `hotel` defaults to `hotel tui`.
///
/// Rules:
/// - `hotel`                        -> `hotel tui`
/// - `hotel --source x.csv ...`     -> `hotel tui --source x.csv ...`
/// - `hotel --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "summary" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
