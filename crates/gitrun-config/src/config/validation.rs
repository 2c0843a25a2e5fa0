use encoding_rs::Encoding;
use gitrun_runner::RunnerMode;

use super::Config;
use crate::error::ConfigError;

impl Config {
    /// Validate configuration values
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if let Some(command) = &self.git.command
            && command.trim().is_empty()
        {
            return Err(ConfigError::invalid_value("git_command", "must not be empty"));
        }

        if let Some(tool) = &self.runner.tool
            && tool.trim().is_empty()
        {
            return Err(ConfigError::invalid_value("wsl_tool", "must not be empty"));
        }

        if let Some(launcher) = &self.runner.wsl_launcher
            && launcher.as_os_str().is_empty()
        {
            return Err(ConfigError::invalid_value("wsl_launcher", "must not be empty"));
        }

        self.runner_mode()?;
        self.output_encoding()?;

        Ok(())
    }
}

pub(crate) fn parse_runner_mode(value: &str) -> Result<RunnerMode, ConfigError> {
    value
        .parse::<RunnerMode>()
        .map_err(|reason| ConfigError::invalid_value("runner_mode", reason))
}

pub(crate) fn parse_encoding(label: &str) -> Result<&'static Encoding, ConfigError> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
        ConfigError::invalid_value("output_encoding", format!("Unknown encoding label: {label}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_encoding_accepts_whatwg_labels() {
        assert_eq!(parse_encoding("utf-8").unwrap(), encoding_rs::UTF_8);
        assert_eq!(parse_encoding("latin1").unwrap(), encoding_rs::WINDOWS_1252);
        assert_eq!(parse_encoding(" Shift_JIS ").unwrap(), encoding_rs::SHIFT_JIS);
        assert!(parse_encoding("cp-does-not-exist").is_err());
    }

    #[test]
    fn test_parse_runner_mode_error_names_key() {
        let err = parse_runner_mode("podman").unwrap_err();
        assert!(err.to_string().contains("runner_mode"));
        assert!(err.to_string().contains("podman"));
    }

    #[test]
    fn test_blank_git_command_rejected() {
        let mut config = Config::default();
        config.git.command = Some("  ".to_string());
        assert!(config.validate().is_err());
    }
}
