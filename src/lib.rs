//! `hotel-dash` library crate.
//!
//! The binary (`hotel`) is a thin wrapper around this library so that:
//!
//! - ingest, aggregation and filtering are testable without a terminal
//! - the summary printer and the TUI render from the same derived view

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod dashboard;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod report;
pub mod tui;
