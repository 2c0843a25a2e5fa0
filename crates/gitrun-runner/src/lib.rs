//! Git invocation across native and WSL environments
//!
//! Resolves which git to launch for a working directory, rewrites arguments
//! for git running inside a WSL distro, and launches the process with
//! redirected, decoded output and a handle that can kill the whole tree.
//!
//! All launches go through [`Executable`]: the argument filter runs first, the
//! resulting line is handed to the OS as a single command line on Windows and
//! split into argv elements elsewhere. Callers holding separate arguments join
//! them with [`GitCommandRunner::join_arguments`], which quotes for whichever
//! of those two the runner ends up using.

pub mod error;
pub mod executable;
pub mod filter;
pub mod git;
pub mod invocation;
pub mod platform;
pub mod process;
pub mod quoting;
pub mod translate;
pub mod types;

pub use error::{RunnerError, TranslationError};
pub use executable::{
    CachedPath, Executable, PreparedCommand, WSL_EXE, WSL_LAUNCHER, join_command_line,
};
pub use filter::{
    ArgumentFilter, DEFAULT_WSL_TOOL, IdentityFilter, WslArgumentFilter, join_wsl_arguments,
};
pub use git::{
    GitCommandRunner, NativeGitCommandRunner, RunnerSettings, WslGitCommandRunner, runner_for,
};
pub use invocation::{CommandInvocation, DEFAULT_GIT_COMMAND};
pub use platform::KillSwitch;
pub use process::{ProcessHandle, ProcessState, StartOptions};
pub use quoting::{LONG_ARGUMENT_PATTERN, LongOptionNormalizer, standardize_quotes};
pub use translate::{EXPLORER_PREFIX, TranslationContext, extract_identifier, is_nested_path};
pub use types::RunnerMode;
