//! Command-line interface for parex
//!
//! A thin harness over the library: it loads configuration, builds a worker
//! pool and runs the verification commands.

pub mod commands;
pub mod output;

pub use commands::Cli;
pub use output::Output;
