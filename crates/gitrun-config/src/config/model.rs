use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use gitrun_utils::types::ConfigSource;

/// Configuration for gitrun.
///
/// Values are layered with precedence CLI arguments > config file > built-in
/// defaults; `source_attribution` records which layer each key came from.
///
/// # Config file
///
/// ```toml
/// [git]
/// command = "git"
///
/// [runner]
/// mode = "auto"          # auto | native | wsl
/// wsl_launcher = 'C:\Windows\System32\wsl.exe'
/// tool = "git"
///
/// [output]
/// encoding = "utf-8"     # any WHATWG encoding label
///
/// [defaults]
/// verbose = false
/// ```
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub git: GitConfig,
    pub runner: RunnerConfig,
    pub output: OutputConfig,
    pub defaults: Defaults,
    /// Which layer each key's value came from
    pub source_attribution: HashMap<String, ConfigSource>,
    /// The file that was loaded, if any
    pub config_path: Option<PathBuf>,
}

/// `[git]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GitConfig {
    /// Program used for native runs (default `git`)
    pub command: Option<String>,
}

/// `[runner]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RunnerConfig {
    /// `auto`, `native` or `wsl`
    pub mode: Option<String>,
    /// Explicit `wsl.exe` location
    pub wsl_launcher: Option<PathBuf>,
    /// Program run inside the distro (default `git`)
    pub tool: Option<String>,
}

/// `[output]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Encoding label for redirected git output
    pub encoding: Option<String>,
}

/// `[defaults]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    pub verbose: Option<bool>,
}
