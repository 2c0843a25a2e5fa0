use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{CliArgs, Config, ConfigSource, Defaults, GitConfig, OutputConfig, RunnerConfig};
use crate::error::ConfigError;

/// Environment variable naming a directory that holds `config.toml`.
pub const HOME_ENV: &str = "GITRUN_HOME";

/// Directory searched for upward from the working directory.
pub const CONFIG_DIR: &str = ".gitrun";

pub const CONFIG_FILE: &str = "config.toml";

/// Keys that always carry an attribution, defaults included.
const ATTRIBUTED_KEYS: [&str; 6] = [
    "git_command",
    "runner_mode",
    "wsl_tool",
    "output_encoding",
    "verbose",
    "wsl_launcher",
];

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
pub(crate) struct TomlConfig {
    git: Option<GitConfig>,
    runner: Option<RunnerConfig>,
    output: Option<OutputConfig>,
    defaults: Option<Defaults>,
}

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// Uses the current working directory for config file discovery when no
    /// explicit path is provided in `cli_args`.
    pub fn discover(cli_args: &CliArgs) -> Result<Self> {
        let start_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory.
    ///
    /// `GITRUN_HOME` is consulted when no explicit path is given.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self> {
        let home = std::env::var_os(HOME_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self::discover_with_home(start_dir, home.as_deref(), cli_args)
    }

    /// Path-driven discovery without reading process-global state.
    pub fn discover_with_home(
        start_dir: &Path,
        home: Option<&Path>,
        cli_args: &CliArgs,
    ) -> Result<Self> {
        let config_path = match &cli_args.config_path {
            Some(explicit) => Some(explicit.clone()),
            None => Self::discover_config_file(start_dir, home),
        };

        let mut config = Self {
            source_attribution: Self::default_attribution(),
            ..Self::default()
        };

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?;
            config.apply_file(file_config);
            tracing::debug!(path = %path.display(), "loaded configuration file");
        }
        config.config_path = config_path;

        config.apply_cli(cli_args);
        config.validate()?;

        Ok(config)
    }

    /// Locate a config file: `<home>/config.toml` first, then an upward
    /// search for `.gitrun/config.toml` that stops at a repository root.
    #[must_use]
    pub fn discover_config_file(start_dir: &Path, home: Option<&Path>) -> Option<PathBuf> {
        if let Some(home) = home {
            let candidate = home.join(CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        let mut current_dir = Some(start_dir);
        while let Some(dir) = current_dir {
            let candidate = dir.join(CONFIG_DIR).join(CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }

            // Stop at repository root markers
            if dir.join(".git").exists() || dir.join(".hg").exists() || dir.join(".svn").exists() {
                break;
            }

            current_dir = dir.parent();
        }

        None
    }

    /// Load configuration from a TOML file. A missing file is an empty config.
    pub(crate) fn load_config_file(path: &Path) -> Result<TomlConfig, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)
                .map_err(|err| ConfigError::InvalidFile(format!("{}: {err}", path.display()))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(TomlConfig::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn apply_file(&mut self, file: TomlConfig) {
        let attribution = &mut self.source_attribution;
        let mut mark = |key: &str| {
            attribution.insert(key.to_string(), ConfigSource::Config);
        };

        if let Some(git) = file.git
            && git.command.is_some()
        {
            self.git.command = git.command;
            mark("git_command");
        }

        if let Some(runner) = file.runner {
            if runner.mode.is_some() {
                self.runner.mode = runner.mode;
                mark("runner_mode");
            }
            if runner.wsl_launcher.is_some() {
                self.runner.wsl_launcher = runner.wsl_launcher;
                mark("wsl_launcher");
            }
            if runner.tool.is_some() {
                self.runner.tool = runner.tool;
                mark("wsl_tool");
            }
        }

        if let Some(output) = file.output
            && output.encoding.is_some()
        {
            self.output.encoding = output.encoding;
            mark("output_encoding");
        }

        if let Some(defaults) = file.defaults
            && defaults.verbose.is_some()
        {
            self.defaults.verbose = defaults.verbose;
            mark("verbose");
        }
    }

    fn apply_cli(&mut self, cli: &CliArgs) {
        let mut overridden = Vec::new();

        if let Some(command) = &cli.git_command {
            self.git.command = Some(command.clone());
            overridden.push("git_command");
        }
        if let Some(mode) = &cli.runner_mode {
            self.runner.mode = Some(mode.clone());
            overridden.push("runner_mode");
        }
        if let Some(launcher) = &cli.wsl_launcher {
            self.runner.wsl_launcher = Some(launcher.clone());
            overridden.push("wsl_launcher");
        }
        if let Some(tool) = &cli.wsl_tool {
            self.runner.tool = Some(tool.clone());
            overridden.push("wsl_tool");
        }
        if let Some(encoding) = &cli.encoding {
            self.output.encoding = Some(encoding.clone());
            overridden.push("output_encoding");
        }
        if let Some(verbose) = cli.verbose {
            self.defaults.verbose = Some(verbose);
            overridden.push("verbose");
        }

        for key in overridden {
            self.source_attribution
                .insert(key.to_string(), ConfigSource::Cli);
        }
    }

    /// Configuration from the environment and filesystem only, no CLI overrides.
    pub fn discover_from_env_and_fs() -> Result<Self> {
        Self::discover(&CliArgs::default())
    }

    /// Fresh attribution map with every key at `Default`.
    pub(crate) fn default_attribution() -> HashMap<String, ConfigSource> {
        ATTRIBUTED_KEYS
            .iter()
            .map(|key| ((*key).to_string(), ConfigSource::Default))
            .collect()
    }
}
