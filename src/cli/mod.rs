//! Command-line interface for gitrun
//!
//! ## Module Structure
//!
//! - `args`: CLI argument definitions and parsing structures (clap)
//! - `run`: Main entry point and command dispatch
//! - `commands`: Command implementations and helpers
//! - `console`: Terminal rendering of a running session

pub mod args;
mod commands;
pub mod console;
mod run;

pub use args::{Cli, Commands, build_cli};
pub use commands::exit_code_of;
pub use console::ConsoleSink;
pub use run::run;
