//! Configuration for gitrun
//!
//! Hierarchical configuration with discovery and precedence CLI > file >
//! defaults, read from `.gitrun/config.toml`.

pub mod config;
pub mod error;

pub use config::{
    CliArgs, Config, ConfigBuilder, ConfigSource, ConfigValue, Defaults, GitConfig, OutputConfig,
    RunnerConfig,
};
pub use error::ConfigError;
