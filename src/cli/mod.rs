//! Command-line interface for rhetor.
//!
//! Provides commands for running debates, checking backend connectivity,
//! and browsing saved conversation records.

mod commands;

pub use commands::{parse_cli, run, run_with_cli};
