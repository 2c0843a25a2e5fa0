use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command as TokioCommand;

use crate::error::RunnerError;
use crate::filter::{ArgumentFilter, IdentityFilter};
use crate::process::{ProcessHandle, StartOptions};

/// Launcher used to reach WSL distros.
pub const WSL_EXE: &str = "wsl.exe";

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

// ============================================================================
// CachedPath - once-computed program location
// ============================================================================

/// A program location computed on first use and reused afterwards.
///
/// Resolution may hit the filesystem or `PATH`, and its result cannot change
/// for the life of the process. Concurrent first calls may both compute; the
/// result is deterministic so whichever value lands first is kept.
#[derive(Debug)]
pub struct CachedPath {
    cell: OnceCell<PathBuf>,
    compute: fn() -> PathBuf,
}

impl CachedPath {
    #[must_use]
    pub const fn new(compute: fn() -> PathBuf) -> Self {
        Self {
            cell: OnceCell::new(),
            compute,
        }
    }

    /// The cached path, computed now if this is the first call.
    pub fn resolve(&self) -> &Path {
        self.cell.get_or_init(self.compute)
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }
}

/// Process-wide location of `wsl.exe`.
pub static WSL_LAUNCHER: CachedPath = CachedPath::new(locate_wsl_launcher);

/// `%SystemRoot%\sysnative\wsl.exe` for 32-bit hosts, `System32` otherwise,
/// then a `PATH` lookup, then the bare name.
fn locate_wsl_launcher() -> PathBuf {
    if cfg!(windows)
        && let Some(root) = std::env::var_os("SystemRoot").or_else(|| std::env::var_os("WINDIR"))
    {
        let root = PathBuf::from(root);
        for dir in ["sysnative", "System32"] {
            let candidate = root.join(dir).join(WSL_EXE);
            if candidate.is_file() {
                return candidate;
            }
        }
    }

    which::which(WSL_EXE)
        .or_else(|_| which::which("wsl"))
        .unwrap_or_else(|_| PathBuf::from(WSL_EXE))
}

// ============================================================================
// Executable - program + working directory + argument filter
// ============================================================================

#[derive(Debug)]
enum Program {
    Named { name: String, resolved: OnceCell<PathBuf> },
    Shared(&'static CachedPath),
}

impl Program {
    fn resolve(&self) -> &Path {
        match self {
            Self::Named { name, resolved } => resolved.get_or_init(|| {
                which::which(name).unwrap_or_else(|_| PathBuf::from(name))
            }),
            Self::Shared(cached) => cached.resolve(),
        }
    }
}

/// A program bound to a working directory and an argument filter.
///
/// ```rust,no_run
/// use gitrun_runner::{Executable, StartOptions};
///
/// # async fn example() -> Result<(), gitrun_runner::RunnerError> {
/// let git = Executable::new("git", "/path/to/repo");
/// let mut handle = git.start(Some("status --short"), &StartOptions::redirected())?;
/// let state = handle.wait().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Executable {
    program: Arc<Program>,
    working_dir: PathBuf,
    filter: Arc<dyn ArgumentFilter>,
}

impl std::fmt::Debug for Executable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executable")
            .field("program", &self.program)
            .field("working_dir", &self.working_dir)
            .finish_non_exhaustive()
    }
}

impl Executable {
    /// A program looked up on `PATH` once, with arguments passed unchanged.
    #[must_use]
    pub fn new(program: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: Arc::new(Program::Named {
                name: program.into(),
                resolved: OnceCell::new(),
            }),
            working_dir: working_dir.into(),
            filter: Arc::new(IdentityFilter),
        }
    }

    /// A program whose location is a process-wide [`CachedPath`].
    #[must_use]
    pub fn with_cached_program(program: &'static CachedPath, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: Arc::new(Program::Shared(program)),
            working_dir: working_dir.into(),
            filter: Arc::new(IdentityFilter),
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Arc<dyn ArgumentFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Resolved program path (computed on first call).
    pub fn program_path(&self) -> &Path {
        self.program.resolve()
    }

    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    #[must_use]
    pub fn filter(&self) -> &Arc<dyn ArgumentFilter> {
        &self.filter
    }

    /// Apply the filter and bind everything needed for a launch.
    #[must_use]
    pub fn prepare(&self, arguments: Option<&str>) -> PreparedCommand {
        PreparedCommand {
            program: self.program_path().to_path_buf(),
            arguments: self.filter.filter(arguments),
            cwd: Some(self.working_dir.clone()),
            env: BTreeMap::new(),
        }
    }

    /// Prepare and launch in one step.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::SpawnFailed`] when the OS refuses to create the process.
    pub fn start(
        &self,
        arguments: Option<&str>,
        options: &StartOptions,
    ) -> Result<ProcessHandle, RunnerError> {
        self.prepare(arguments).spawn(options)
    }
}

// ============================================================================
// Native command lines
// ============================================================================

/// Join argv elements into the argument line a native launch splits back into
/// exactly those elements.
///
/// Elsewhere this is shell-word quoting, the inverse of
/// [`PreparedCommand::argv`]. On Windows the line is handed to the program
/// verbatim, so elements are quoted for the Microsoft C runtime parser.
#[must_use]
pub fn join_command_line<S: AsRef<str>>(args: &[S]) -> String {
    #[cfg(windows)]
    {
        args.iter()
            .map(|arg| quote_windows_argument(arg.as_ref()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[cfg(not(windows))]
    {
        shell_words::join(args)
    }
}

/// Quote one element so `CommandLineToArgvW` and the CRT recover it unchanged.
///
/// Backslashes are literal except in front of a double quote, where they
/// escape; runs of them before a quote (or the closing quote) are doubled.
#[cfg_attr(not(windows), allow(dead_code))]
fn quote_windows_argument(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains([' ', '\t', '\n', '\x0b', '"']) {
        return arg.to_string();
    }

    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    let mut backslashes = 0;
    for c in arg.chars() {
        match c {
            '\\' => {
                backslashes += 1;
                continue;
            }
            '"' => {
                quoted.extend(std::iter::repeat_n('\\', backslashes * 2 + 1));
                quoted.push('"');
            }
            _ => {
                quoted.extend(std::iter::repeat_n('\\', backslashes));
                quoted.push(c);
            }
        }
        backslashes = 0;
    }
    quoted.extend(std::iter::repeat_n('\\', backslashes * 2));
    quoted.push('"');
    quoted
}

// ============================================================================
// PreparedCommand - a fully filtered command line ready to launch
// ============================================================================

/// Program plus the filtered argument line.
///
/// The argument line is a single string: on Windows it is passed to the
/// program verbatim, elsewhere it is split with shell-word rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCommand {
    pub program: PathBuf,
    pub arguments: String,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl PreparedCommand {
    /// Add an environment override. Values are passed through untouched.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn envs<I, K, V>(mut self, envs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in envs {
            self.env.insert(key.into(), value.into());
        }
        self
    }

    /// Human-readable command line: program (quoted when it has spaces) and arguments.
    #[must_use]
    pub fn display_line(&self) -> String {
        let program = self.program.display().to_string();
        let program = if program.contains(' ') {
            format!("\"{program}\"")
        } else {
            program
        };

        if self.arguments.is_empty() {
            program
        } else {
            format!("{program} {}", self.arguments)
        }
    }

    /// The argument line split into argv elements.
    ///
    /// Lines built by [`join_command_line`] split back exactly. Malformed
    /// quoting in a hand-written line degrades to whitespace splitting.
    #[must_use]
    pub fn argv(&self) -> Vec<String> {
        shell_words::split(&self.arguments).unwrap_or_else(|err| {
            tracing::debug!(error = %err, "argument line is not shell-quoted; splitting on whitespace");
            self.arguments
                .split_whitespace()
                .map(str::to_string)
                .collect()
        })
    }

    /// Convert into a `tokio::process::Command`.
    #[must_use]
    pub fn to_tokio_command(&self) -> TokioCommand {
        let mut cmd = TokioCommand::new(&self.program);

        #[cfg(windows)]
        if !self.arguments.is_empty() {
            cmd.raw_arg(&self.arguments);
        }

        #[cfg(not(windows))]
        cmd.args(self.argv());

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        cmd
    }

    /// Launch the process.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::SpawnFailed`] carrying the OS error.
    pub fn spawn(&self, options: &StartOptions) -> Result<ProcessHandle, RunnerError> {
        let mut cmd = self.to_tokio_command();

        cmd.stdin(if options.redirect_input {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        if options.redirect_output {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }

        #[cfg(windows)]
        if !options.create_window {
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        #[cfg(unix)]
        cmd.process_group(0);

        let program = self.program.display().to_string();
        let child = cmd.spawn().map_err(|source| RunnerError::SpawnFailed {
            program: program.clone(),
            source,
        })?;

        let handle = ProcessHandle::new(child, program, options.output_encoding);
        tracing::debug!(
            program = %handle.program(),
            pid = ?handle.pid(),
            encoding = handle.encoding().name(),
            "process started"
        );
        Ok(handle)
    }
}
