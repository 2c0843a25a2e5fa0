use std::path::PathBuf;

/// Overrides supplied on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Explicit config file; skips discovery
    pub config_path: Option<PathBuf>,
    pub git_command: Option<String>,
    pub runner_mode: Option<String>,
    pub wsl_launcher: Option<PathBuf>,
    pub wsl_tool: Option<String>,
    pub encoding: Option<String>,
    pub verbose: Option<bool>,
}
