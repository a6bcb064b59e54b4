//! Utility functions for string formatting.

pub mod format;

pub use format::{format_duration_secs, format_quantity, truncate};
