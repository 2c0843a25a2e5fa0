//! Error types for the runner crate

use std::io;
use thiserror::Error;

/// A host working directory could not be turned into a WSL translation context.
///
/// Construction of a [`TranslationContext`](crate::TranslationContext) fails
/// outright with one of these; no partial context is ever produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    #[error("'{path}' is not a WSL path (expected a '\\\\wsl$\\' prefix)")]
    NotNestedPath { path: String },

    #[error("cannot isolate the WSL distro name in '{path}'")]
    MissingIdentifier { path: String },
}

/// Errors raised while preparing or launching a git process.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error("failed to start '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("WSL not available: {reason}")]
    WslNotAvailable { reason: String },

    #[error("Runner configuration invalid: {reason}")]
    ConfigurationInvalid { reason: String },
}

impl RunnerError {
    /// Whether the error came from the OS refusing to create the process.
    #[must_use]
    pub const fn is_spawn_failure(&self) -> bool {
        matches!(self, Self::SpawnFailed { .. })
    }
}
