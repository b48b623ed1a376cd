//! Shared utilities for globstream CLI binaries.
//!
//! This crate provides argument types, logging setup and number formatting
//! used by the `gs-glob` CLI.

pub mod args;
pub mod format;
pub mod logging;

pub use args::{LogLevel, parse_key_value, parse_positive_usize};
pub use format::{format_bytes, format_number};
pub use logging::init_logging;
