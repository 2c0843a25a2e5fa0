use encoding_rs::Encoding;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::filter::ArgumentFilter;
use crate::git::GitCommandRunner;

/// Program used when none is configured.
pub const DEFAULT_GIT_COMMAND: &str = "git";

/// One requested git command: what to run, where, and with what.
///
/// Built with a fluent API in the style of a process builder:
///
/// ```rust
/// use gitrun_runner::CommandInvocation;
///
/// let invocation = CommandInvocation::new("/path/to/repo")
///     .arguments("fetch --all --progress")
///     .env("GIT_TERMINAL_PROMPT", "0");
/// assert_eq!(invocation.program_name(), "git");
/// ```
#[derive(Clone, Default)]
pub struct CommandInvocation {
    program: Option<String>,
    arguments: Option<String>,
    working_dir: PathBuf,
    input: Option<String>,
    env: BTreeMap<String, String>,
    filter: Option<Arc<dyn ArgumentFilter>>,
    encoding: Option<&'static Encoding>,
}

impl std::fmt::Debug for CommandInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandInvocation")
            .field("program", &self.program)
            .field("arguments", &self.arguments)
            .field("working_dir", &self.working_dir)
            .field("input", &self.input.as_ref().map(String::len))
            .field("env", &self.env)
            .field("filtered", &self.filter.is_some())
            .field("encoding", &self.encoding.map(Encoding::name))
            .finish()
    }
}

impl CommandInvocation {
    #[must_use]
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            ..Self::default()
        }
    }

    /// An invocation launched the way `runner` launches git: same program,
    /// working directory, argument filter and default output encoding.
    #[must_use]
    pub fn for_runner(runner: &dyn GitCommandRunner) -> Self {
        let executable = runner.executable();
        Self {
            program: Some(executable.program_path().to_string_lossy().into_owned()),
            working_dir: executable.working_dir().to_path_buf(),
            filter: Some(executable.filter().clone()),
            encoding: Some(runner.default_encoding()),
            ..Self::default()
        }
    }

    /// Override the program (defaults to the configured git command).
    #[must_use]
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// Raw argument string, exactly as the caller wrote it.
    #[must_use]
    pub fn arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = Some(arguments.into());
        self
    }

    /// Stdin payload. Only an empty payload is accepted at launch.
    #[must_use]
    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: Arc<dyn ArgumentFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Encoding of redirected output.
    #[must_use]
    pub fn encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    #[must_use]
    pub fn program_name(&self) -> &str {
        self.program.as_deref().unwrap_or(DEFAULT_GIT_COMMAND)
    }

    #[must_use]
    pub fn raw_arguments(&self) -> Option<&str> {
        self.arguments.as_deref()
    }

    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    #[must_use]
    pub fn stdin_payload(&self) -> Option<&str> {
        self.input.as_deref()
    }

    /// True when a non-empty stdin payload was supplied.
    #[must_use]
    pub fn has_input(&self) -> bool {
        self.input.as_deref().is_some_and(|input| !input.is_empty())
    }

    #[must_use]
    pub fn env_overrides(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    #[must_use]
    pub fn output_encoding(&self) -> Option<&'static Encoding> {
        self.encoding
    }

    #[must_use]
    pub fn argument_filter(&self) -> Option<&Arc<dyn ArgumentFilter>> {
        self.filter.as_ref()
    }

    /// Human-readable line: the program, quoted when it contains a space,
    /// followed by the raw (unfiltered) arguments.
    #[must_use]
    pub fn display_line(&self) -> String {
        let program = self.program_name();
        let program = if program.contains(' ') {
            format!("\"{program}\"")
        } else {
            program.to_string()
        };

        match self.arguments.as_deref() {
            Some(arguments) if !arguments.is_empty() => format!("{program} {arguments}"),
            _ => program,
        }
    }
}
