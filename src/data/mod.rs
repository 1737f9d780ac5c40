//! Data acquisition: where the booking CSV comes from and how it is loaded.

pub mod loader;

pub use loader::*;
