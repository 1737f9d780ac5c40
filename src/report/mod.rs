//! Reporting utilities: plain-text summaries of a dashboard view.

pub mod format;

pub use format::*;
