//! Top-level error type and exit code mapping
//!
//! Library crates return their own typed errors. [`GitrunError`] gathers them
//! so the CLI can report one thing and pick one exit code.

use thiserror::Error;

use gitrun_config::ConfigError;
use gitrun_runner::{RunnerError, TranslationError};
use gitrun_session::SessionError;
use gitrun_utils::exit_codes::ExitCode;

#[derive(Error, Debug)]
pub enum GitrunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<TranslationError> for GitrunError {
    fn from(err: TranslationError) -> Self {
        Self::Runner(RunnerError::Translation(err))
    }
}

impl GitrunError {
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) => ExitCode::CLI_ARGS,
            Self::Runner(err) => runner_exit_code(err),
            Self::Session(err) => session_exit_code(err),
        }
    }

    /// Things the user can try, most likely first.
    #[must_use]
    pub fn suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::Config(_) => vec![
                "Check the [git], [runner], [output] and [defaults] sections of .gitrun/config.toml",
                "Runner mode must be one of: auto, native, wsl",
                "Run `gitrun config` to see the effective configuration",
            ],
            Self::Runner(RunnerError::Translation(_))
            | Self::Session(SessionError::Spawn(RunnerError::Translation(_))) => vec![
                r"WSL working directories look like \\wsl$\<distro>\path\to\repo",
                "Use --mode native for directories outside a WSL distro",
            ],
            Self::Runner(RunnerError::WslNotAvailable { .. }) => vec![
                "Install WSL or set runner.wsl_launcher to the full path of wsl.exe",
            ],
            Self::Runner(RunnerError::SpawnFailed { .. })
            | Self::Session(SessionError::Spawn(RunnerError::SpawnFailed { .. })) => vec![
                "Check that git is installed and on PATH",
                "Set git.command in the config file to an absolute path",
            ],
            _ => Vec::new(),
        }
    }

    /// Message plus suggestions, ready for stderr.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = format!("Error: {self}\n");

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }
        output
    }
}

fn session_exit_code(err: &SessionError) -> ExitCode {
    match err {
        SessionError::Spawn(err) => runner_exit_code(err),
        SessionError::StdinNotSupported => ExitCode::CLI_ARGS,
        SessionError::AlreadyStarted => ExitCode::INTERNAL,
    }
}

fn runner_exit_code(err: &RunnerError) -> ExitCode {
    match err {
        RunnerError::Translation(_) => ExitCode::TRANSLATION,
        RunnerError::SpawnFailed { .. } | RunnerError::WslNotAvailable { .. } => {
            ExitCode::SPAWN_FAILURE
        }
        RunnerError::ConfigurationInvalid { .. } => ExitCode::CLI_ARGS,
    }
}

/// Exit code for any error reaching the CLI.
///
/// Looks through the whole cause chain, so errors wrapped with
/// `anyhow::Context` still map to their specific code.
#[must_use]
pub fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    for cause in error.chain() {
        if let Some(err) = cause.downcast_ref::<GitrunError>() {
            return err.to_exit_code();
        }
        if cause.is::<ConfigError>() {
            return ExitCode::CLI_ARGS;
        }
        if let Some(err) = cause.downcast_ref::<RunnerError>() {
            return runner_exit_code(err);
        }
        if cause.is::<TranslationError>() {
            return ExitCode::TRANSLATION;
        }
        if let Some(err) = cause.downcast_ref::<SessionError>() {
            return session_exit_code(err);
        }
    }
    ExitCode::INTERNAL
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    fn spawn_failed() -> RunnerError {
        RunnerError::SpawnFailed {
            program: "git".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        }
    }

    #[test]
    fn test_exit_codes_by_kind() {
        let translation = TranslationError::NotNestedPath {
            path: "/tmp".to_string(),
        };
        assert_eq!(
            GitrunError::from(translation).to_exit_code(),
            ExitCode::TRANSLATION
        );
        assert_eq!(
            GitrunError::from(spawn_failed()).to_exit_code(),
            ExitCode::SPAWN_FAILURE
        );
        assert_eq!(
            GitrunError::from(SessionError::Spawn(spawn_failed())).to_exit_code(),
            ExitCode::SPAWN_FAILURE
        );
        assert_eq!(
            GitrunError::from(SessionError::StdinNotSupported).to_exit_code(),
            ExitCode::CLI_ARGS
        );
        assert_eq!(
            GitrunError::from(ConfigError::InvalidFile("bad".to_string())).to_exit_code(),
            ExitCode::CLI_ARGS
        );
    }

    #[test]
    fn test_exit_code_for_looks_through_context() {
        let err = Err::<(), _>(ConfigError::InvalidValue {
            key: "runner.mode".to_string(),
            value: "docker".to_string(),
        })
        .context("Failed to load configuration")
        .unwrap_err();
        assert_eq!(exit_code_for(&err), ExitCode::CLI_ARGS);

        let err = anyhow::Error::new(spawn_failed()).context("launching git");
        assert_eq!(exit_code_for(&err), ExitCode::SPAWN_FAILURE);

        let err = anyhow::Error::new(SessionError::Spawn(RunnerError::Translation(
            TranslationError::MissingIdentifier {
                path: r"\\wsl$\U".to_string(),
            },
        )));
        assert_eq!(exit_code_for(&err), ExitCode::TRANSLATION);
    }

    #[test]
    fn test_unknown_errors_are_internal() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(exit_code_for(&err), ExitCode::INTERNAL);
    }

    #[test]
    fn test_display_for_user_lists_suggestions() {
        let text = GitrunError::from(spawn_failed()).display_for_user();
        assert!(text.starts_with("Error: failed to start 'git'"));
        assert!(text.contains("Suggestions:"));
        assert!(text.contains("on PATH"));
    }
}
