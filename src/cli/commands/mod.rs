//! CLI command implementations (facade).
//!
//! This module re-exports the command surface used by `run.rs`.
//! Implementations live in `commands/*`.

mod common;
mod config;
mod run_git;
mod translate;

pub use common::{build_runner, raw_arguments, resolve_working_dir};
pub use config::execute_config_command;
pub use run_git::{execute_run_command, exit_code_of};
pub use translate::execute_translate_command;
