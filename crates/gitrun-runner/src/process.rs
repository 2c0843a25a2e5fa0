use encoding_rs::{Encoding, UTF_8};
use std::io;
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout};

use crate::platform::KillSwitch;

// ============================================================================
// StartOptions - stream redirection and decoding for a launch
// ============================================================================

/// How a process is launched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartOptions {
    /// Show a console window (Windows only; ignored elsewhere)
    pub create_window: bool,
    /// Pipe stdin instead of connecting it to null
    pub redirect_input: bool,
    /// Pipe stdout and stderr instead of inheriting them
    pub redirect_output: bool,
    /// Encoding of redirected output; `None` means the runner's default
    pub output_encoding: Option<&'static Encoding>,
}

impl StartOptions {
    /// Output piped back to the caller, stdin closed.
    #[must_use]
    pub fn redirected() -> Self {
        Self {
            redirect_output: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.output_encoding = Some(encoding);
        self
    }
}

/// Observable state of a launched process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    Exited(i32),
    /// Terminated by a signal or a hard kill; no exit code available
    Killed,
}

impl ProcessState {
    /// Exit code, if the process exited on its own terms.
    #[must_use]
    pub const fn code(self) -> Option<i32> {
        match self {
            Self::Exited(code) => Some(code),
            Self::Running | Self::Killed => None,
        }
    }
}

// ============================================================================
// ProcessHandle - a running git process
// ============================================================================

/// A launched process.
///
/// Owns the child; its output pipes can be taken out once for a reader. The
/// [`KillSwitch`] can be cloned out so the tree can be killed while another
/// task is waiting on the child.
#[derive(Debug)]
pub struct ProcessHandle {
    child: Child,
    program: String,
    encoding: &'static Encoding,
    kill_switch: KillSwitch,
    state: ProcessState,
}

impl ProcessHandle {
    pub(crate) fn new(child: Child, program: String, encoding: Option<&'static Encoding>) -> Self {
        let kill_switch = KillSwitch::attach(&child);
        Self {
            child,
            program,
            encoding: encoding.unwrap_or(UTF_8),
            kill_switch,
            state: ProcessState::Running,
        }
    }

    /// OS process id captured at launch.
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.kill_switch.pid()
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Encoding the output pipes should be decoded with.
    #[must_use]
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    #[must_use]
    pub fn state(&self) -> ProcessState {
        self.state
    }

    #[must_use]
    pub fn kill_switch(&self) -> KillSwitch {
        self.kill_switch.clone()
    }

    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    pub fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.child.stdin.take()
    }

    /// Wait for the process to exit and record the final state.
    pub async fn wait(&mut self) -> io::Result<ProcessState> {
        let status = self.child.wait().await?;
        self.state = match status.code() {
            Some(code) if !self.kill_switch.fired() => ProcessState::Exited(code),
            _ => ProcessState::Killed,
        };
        Ok(self.state)
    }

    /// Hard-kill the process and its descendants.
    pub fn kill(&self) -> io::Result<()> {
        self.kill_switch.kill()
    }
}
