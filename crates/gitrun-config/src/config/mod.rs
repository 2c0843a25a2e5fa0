//! Configuration management for gitrun
//!
//! Hierarchical configuration with discovery and precedence CLI > file >
//! defaults. TOML files carry `[git]`, `[runner]`, `[output]` and `[defaults]`
//! sections.

mod builder;
mod cli_args;
mod discovery;
mod model;
mod validation;

pub use builder::ConfigBuilder;
pub use cli_args::CliArgs;
pub use discovery::{CONFIG_DIR, CONFIG_FILE, HOME_ENV};
pub use gitrun_utils::types::{ConfigSource, ConfigValue};
pub use model::*;

use encoding_rs::Encoding;
use gitrun_runner::{DEFAULT_GIT_COMMAND, DEFAULT_WSL_TOOL, RunnerMode, RunnerSettings};
use serde_json::json;
use std::collections::BTreeMap;

use crate::error::ConfigError;

impl Config {
    /// Runner mode, `auto` when unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unknown mode.
    pub fn runner_mode(&self) -> Result<RunnerMode, ConfigError> {
        match self.runner.mode.as_deref() {
            Some(mode) => validation::parse_runner_mode(mode),
            None => Ok(RunnerMode::Auto),
        }
    }

    /// Encoding for redirected git output, UTF-8 when unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unknown label.
    pub fn output_encoding(&self) -> Result<&'static Encoding, ConfigError> {
        match self.output.encoding.as_deref() {
            Some(label) => validation::parse_encoding(label),
            None => Ok(encoding_rs::UTF_8),
        }
    }

    #[must_use]
    pub fn git_command(&self) -> &str {
        self.git.command.as_deref().unwrap_or(DEFAULT_GIT_COMMAND)
    }

    #[must_use]
    pub fn wsl_tool(&self) -> &str {
        self.runner.tool.as_deref().unwrap_or(DEFAULT_WSL_TOOL)
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.defaults.verbose.unwrap_or(false)
    }

    /// Settings for picking and building a git runner.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unknown encoding label.
    pub fn runner_settings(&self) -> Result<RunnerSettings, ConfigError> {
        Ok(RunnerSettings {
            git_command: self.git_command().to_string(),
            wsl_launcher: self.runner.wsl_launcher.clone(),
            wsl_tool: self.wsl_tool().to_string(),
            encoding: self.output_encoding()?,
        })
    }

    fn source_of(&self, key: &str) -> ConfigSource {
        self.source_attribution
            .get(key)
            .copied()
            .unwrap_or(ConfigSource::Default)
    }

    /// Effective configuration: every key with its value and source.
    ///
    /// Unset optional values are reported as JSON `null`.
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, ConfigValue> {
        let mode = self.runner.mode.clone().unwrap_or_else(|| RunnerMode::Auto.to_string());
        let encoding = self
            .output
            .encoding
            .clone()
            .unwrap_or_else(|| encoding_rs::UTF_8.name().to_string());
        let launcher = self
            .runner
            .wsl_launcher
            .as_ref()
            .map(|path| path.display().to_string());

        let entries = [
            ("git_command", json!(self.git_command())),
            ("runner_mode", json!(mode)),
            ("wsl_launcher", json!(launcher)),
            ("wsl_tool", json!(self.wsl_tool())),
            ("output_encoding", json!(encoding)),
            ("verbose", json!(self.verbose())),
        ];

        entries
            .into_iter()
            .map(|(key, value)| {
                (
                    key.to_string(),
                    ConfigValue {
                        value,
                        source: self.source_of(key),
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.runner_mode().unwrap(), RunnerMode::Auto);
        assert_eq!(config.output_encoding().unwrap(), encoding_rs::UTF_8);
        assert_eq!(config.git_command(), "git");
        assert_eq!(config.wsl_tool(), "git");
        assert!(!config.verbose());
    }

    #[test]
    fn test_runner_settings_carry_values() {
        let config = Config::builder()
            .git_command("/usr/local/bin/git")
            .wsl_launcher(r"C:\Windows\System32\wsl.exe")
            .encoding("windows-1252")
            .build()
            .unwrap();
        let settings = config.runner_settings().unwrap();
        assert_eq!(settings.git_command, "/usr/local/bin/git");
        assert_eq!(
            settings.wsl_launcher,
            Some(PathBuf::from(r"C:\Windows\System32\wsl.exe"))
        );
        assert_eq!(settings.encoding, encoding_rs::WINDOWS_1252);
    }

    #[test]
    fn test_effective_config_lists_every_key_with_source() {
        let config = Config::builder().runner_mode("wsl").build().unwrap();
        let effective = config.effective_config();

        assert_eq!(effective.len(), 6);
        assert_eq!(effective["runner_mode"].value, json!("wsl"));
        assert_eq!(effective["runner_mode"].source, ConfigSource::Programmatic);
        assert_eq!(effective["output_encoding"].value, json!("UTF-8"));
        assert_eq!(effective["output_encoding"].source, ConfigSource::Default);
        assert!(effective["wsl_launcher"].value.is_null());
    }
}
