//! `clv-predict` library crate.
//!
//! The binary (`clv`) is a thin wrapper around this library so that:
//!
//! - the scoring core is testable without spawning processes
//! - the same pipeline serves the CLI, batch scoring, and the TUI
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod models;
pub mod report;
pub mod scoring;
pub mod tui;
