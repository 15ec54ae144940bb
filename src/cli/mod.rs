//! CLI command handlers

pub mod commands;

pub use commands::{build, check, report_diagnostics, schema, DEFAULT_OUTPUT};
