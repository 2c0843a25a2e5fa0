//! gitrun - run git natively or inside WSL
//!
//! gitrun launches one git command for a repository working directory and
//! manages the process to the end: streamed output, progress detection,
//! cooperative abort, and a single success/failure verdict. Repositories that
//! live in a WSL distro (`\\wsl$\<distro>\...`) are reached through `wsl.exe`
//! with paths and option values rewritten for the distro shell.
//!
//! gitrun can be used in two ways:
//! - **CLI**: `gitrun run -- fetch --all`
//! - **Library**: build a [`CommandInvocation`] and drive a [`ProcessSession`]
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Run git in the current repository
//! gitrun run -- status
//!
//! # Show what would be launched for a WSL repository
//! gitrun translate -C '\\wsl$\Ubuntu\home\me\repo' -- log --oneline
//!
//! # Effective configuration
//! gitrun config --json
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use gitrun::{CommandInvocation, ProcessSession, RunnerMode, mailbox, runner_for};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let runner = runner_for(Path::new(r"\\wsl$\Ubuntu\home\me\repo"), RunnerMode::Auto)?;
//! let invocation = CommandInvocation::for_runner(runner.as_ref()).arguments("fetch --progress");
//!
//! let (mailbox, inbox) = mailbox();
//! let session = ProcessSession::new(invocation, mailbox.into_owner());
//! session.start()?;
//! let outcome = session.run(inbox).await;
//! println!("{}", outcome.read_output());
//! # Ok(())
//! # }
//! ```
//!
//! # Stable Public API
//!
//! - [`Config`] and [`ConfigBuilder`] - Configuration management
//! - [`GitCommandRunner`], [`runner_for`] and [`RunnerSettings`] - Runner selection
//! - [`CommandInvocation`] - One requested git command
//! - [`ProcessSession`], [`SessionOutcome`] and [`ExitPolicy`] - Process lifecycle
//! - [`GitrunError`] and [`ExitCode`] - Errors and CLI exit codes

pub mod cli;
pub mod error;
pub mod summary;

// ============================================================================
// Stable Public API
// ============================================================================

/// Configuration for gitrun.
///
/// `Config` provides hierarchical configuration with discovery and precedence:
/// CLI arguments > config file > built-in defaults.
pub use gitrun_config::Config;

/// Builder for programmatic configuration.
///
/// ```rust,no_run
/// use gitrun::Config;
///
/// let config = Config::builder()
///     .runner_mode("wsl")
///     .encoding("windows-1252")
///     .build()
///     .expect("Failed to build config");
/// ```
pub use gitrun_config::ConfigBuilder;

/// CLI argument structure for configuration override.
pub use gitrun_config::CliArgs;

pub use gitrun_config::ConfigError;

/// Exit codes of the `gitrun` binary.
pub use gitrun_utils::exit_codes::ExitCode;

pub use gitrun_utils::types::{ConfigSource, ConfigValue};

pub use error::{GitrunError, exit_code_for};
pub use summary::{RunSummary, SummaryVerdict};

// Runner
pub use gitrun_runner::{
    ArgumentFilter, CommandInvocation, DEFAULT_GIT_COMMAND, DEFAULT_WSL_TOOL, EXPLORER_PREFIX,
    GitCommandRunner, IdentityFilter, LongOptionNormalizer, NativeGitCommandRunner, RunnerError,
    RunnerMode, RunnerSettings, TranslationContext, TranslationError, WslArgumentFilter,
    WslGitCommandRunner, extract_identifier, is_nested_path, runner_for, standardize_quotes,
};

// Session
pub use gitrun_session::{
    ABORTED_SENTINEL, AbortHandle, DefaultExitPolicy, ExitDecision, ExitPolicy, Inbox, Mailbox,
    OutputKind, OwnerContext, ProcessSession, SessionError, SessionExit, SessionMessage,
    SessionOutcome, SessionSink, SessionState, Transcript, Verdict, classify,
    is_operation_aborted, mailbox,
};

/// Internal crates, not covered by semver.
#[doc(hidden)]
pub mod internal {
    pub use gitrun_config as config;
    pub use gitrun_runner as runner;
    pub use gitrun_session as session;
    pub use gitrun_utils as utils;
}
