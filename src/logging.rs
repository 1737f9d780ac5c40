//! Tracing subscriber setup.
//!
//! `RUST_LOG` takes precedence over the `--log-level` flag. The TUI owns the
//! terminal, so it only logs when given a file.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt};

use crate::error::AppError;

pub const DEFAULT_LEVEL: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
    Off,
}

pub fn init(level: &str, target: LogTarget) -> Result<(), AppError> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // A second init (e.g. from tests) keeps the first subscriber.
    match target {
        LogTarget::Off => {}
        LogTarget::Stderr => {
            let _ = fmt::Subscriber::builder()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init();
        }
        LogTarget::File(path) => {
            let file = File::create(&path)
                .map_err(|e| AppError::usage(format!("Failed to create log file '{}': {e}", path.display())))?;
            let _ = fmt::Subscriber::builder()
                .with_env_filter(filter())
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init();
        }
    }
    Ok(())
}
