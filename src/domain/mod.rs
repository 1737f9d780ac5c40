//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the month table and canonical date formatting (`dates`)
//! - validated booking records and aggregate rows (`types`)
//! - the resolved run configuration (`config`)

pub mod config;
pub mod dates;
pub mod types;

pub use config::*;
pub use dates::*;
pub use types::*;
