//! Foundation utilities shared by the gitrun crates

pub mod exit_codes;
pub mod logging;
pub mod types;

pub use exit_codes::ExitCode;
pub use types::{ConfigSource, ConfigValue};
