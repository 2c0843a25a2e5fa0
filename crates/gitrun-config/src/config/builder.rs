use std::path::PathBuf;

use super::{Config, ConfigSource};
use crate::error::ConfigError;

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// ```rust
    /// use gitrun_config::Config;
    ///
    /// let config = Config::builder()
    ///     .runner_mode("native")
    ///     .encoding("utf-8")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.runner.mode.as_deref(), Some("native"));
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for programmatic configuration, independent of files and the
/// environment.
///
/// All values set via the builder are attributed to
/// `ConfigSource::Programmatic`.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    git_command: Option<String>,
    runner_mode: Option<String>,
    wsl_launcher: Option<PathBuf>,
    wsl_tool: Option<String>,
    encoding: Option<String>,
    verbose: Option<bool>,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn git_command(mut self, command: impl Into<String>) -> Self {
        self.git_command = Some(command.into());
        self
    }

    /// `auto`, `native` or `wsl`; checked by [`build`](Self::build).
    #[must_use]
    pub fn runner_mode(mut self, mode: impl Into<String>) -> Self {
        self.runner_mode = Some(mode.into());
        self
    }

    #[must_use]
    pub fn wsl_launcher(mut self, path: impl Into<PathBuf>) -> Self {
        self.wsl_launcher = Some(path.into());
        self
    }

    #[must_use]
    pub fn wsl_tool(mut self, tool: impl Into<String>) -> Self {
        self.wsl_tool = Some(tool.into());
        self
    }

    /// Encoding label, e.g. `utf-8` or `windows-1252`.
    #[must_use]
    pub fn encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = Some(label.into());
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a value fails validation.
    pub fn build(self) -> Result<Config, ConfigError> {
        let mut config = Config {
            source_attribution: Config::default_attribution(),
            ..Config::default()
        };
        let mut set = Vec::new();

        if let Some(command) = self.git_command {
            config.git.command = Some(command);
            set.push("git_command");
        }
        if let Some(mode) = self.runner_mode {
            config.runner.mode = Some(mode);
            set.push("runner_mode");
        }
        if let Some(launcher) = self.wsl_launcher {
            config.runner.wsl_launcher = Some(launcher);
            set.push("wsl_launcher");
        }
        if let Some(tool) = self.wsl_tool {
            config.runner.tool = Some(tool);
            set.push("wsl_tool");
        }
        if let Some(label) = self.encoding {
            config.output.encoding = Some(label);
            set.push("output_encoding");
        }
        if let Some(verbose) = self.verbose {
            config.defaults.verbose = Some(verbose);
            set.push("verbose");
        }

        for key in set {
            config
                .source_attribution
                .insert(key.to_string(), ConfigSource::Programmatic);
        }

        config.validate()?;
        Ok(config)
    }
}
