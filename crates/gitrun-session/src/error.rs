//! Error types for the session crate

use gitrun_runner::RunnerError;
use thiserror::Error;

/// Errors returned when starting a session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session already started")]
    AlreadyStarted,

    #[error("writing to git's stdin is not supported")]
    StdinNotSupported,

    #[error(transparent)]
    Spawn(#[from] RunnerError),
}
