//! Exit codes for the gitrun CLI
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | git ran and the verdict is success |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 3 | `TRANSLATION` | Working directory could not be mapped into WSL |
//! | 4 | `SPAWN_FAILURE` | The git process could not be started |
//! | 5 | `ABORTED` | The run was aborted (Ctrl-C) |
//!
//! When git itself fails, its own non-zero exit code is propagated.

/// Process exit code.
///
/// ```rust
/// use gitrun_utils::ExitCode;
///
/// assert_eq!(ExitCode::ABORTED.as_i32(), 5);
/// assert_eq!(ExitCode::from_git(Some(128)).as_i32(), 128);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - git ran and the verdict is success
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid arguments or configuration
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Translation error - the working directory is not a usable WSL path
    pub const TRANSLATION: ExitCode = ExitCode(3);

    /// Spawn failure - the OS refused to start the process
    pub const SPAWN_FAILURE: ExitCode = ExitCode(4);

    /// Aborted - the run was cancelled before git finished
    pub const ABORTED: ExitCode = ExitCode(5);

    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }

    /// Map git's exit code. A missing code (killed by a signal) is internal.
    #[must_use]
    pub const fn from_git(code: Option<i32>) -> Self {
        match code {
            Some(code) => ExitCode(code),
            None => Self::INTERNAL,
        }
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        // Codes outside 0..=255 are truncated by the OS anyway
        std::process::ExitCode::from((code.0 & 0xff) as u8)
    }
}
