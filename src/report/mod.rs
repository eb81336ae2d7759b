//! Reporting utilities: formatted terminal output for single and batch runs.
//!
//! Formatting lives in one place so:
//! - the scoring code stays clean and testable
//! - output changes are localized

pub mod format;

pub use format::*;
