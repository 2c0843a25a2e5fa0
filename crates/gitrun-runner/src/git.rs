//! Git command runners
//!
//! A [`GitCommandRunner`] binds a git [`Executable`] to a repository working
//! directory and knows which encoding redirected output is in by default. Two
//! implementations exist: [`NativeGitCommandRunner`] launches the configured git
//! directly, [`WslGitCommandRunner`] routes through `wsl.exe` into the distro
//! that owns a `\\wsl$\<distro>\...` working directory.

use encoding_rs::Encoding;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::RunnerError;
use crate::executable::{Executable, PreparedCommand, WSL_LAUNCHER, join_command_line};
use crate::filter::{DEFAULT_WSL_TOOL, WslArgumentFilter, join_wsl_arguments};
use crate::invocation::DEFAULT_GIT_COMMAND;
use crate::process::{ProcessHandle, StartOptions};
use crate::translate::{TranslationContext, is_nested_path};
use crate::types::RunnerMode;

/// Launches git for one working directory.
pub trait GitCommandRunner: Send + Sync + std::fmt::Debug {
    /// `Native` or `Wsl`; never `Auto`.
    fn mode(&self) -> RunnerMode;

    fn executable(&self) -> &Executable;

    /// Encoding applied to redirected output when the caller picks none.
    fn default_encoding(&self) -> &'static Encoding;

    /// Join separate arguments into the raw line this runner's filter expects.
    fn join_arguments(&self, args: &[String]) -> String {
        join_command_line(args)
    }

    /// Check that whatever the runner launches can be found.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::WslNotAvailable`] when the WSL launcher is missing.
    fn check_available(&self) -> Result<(), RunnerError> {
        Ok(())
    }

    /// The command that `run_detached` would launch.
    fn prepare(&self, arguments: Option<&str>) -> PreparedCommand {
        self.executable().prepare(arguments)
    }

    /// Launch git and hand back the running process.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::SpawnFailed`] when the process cannot be created.
    fn run_detached(
        &self,
        arguments: Option<&str>,
        options: StartOptions,
    ) -> Result<ProcessHandle, RunnerError> {
        let mut options = options;
        if options.redirect_output && options.output_encoding.is_none() {
            options.output_encoding = Some(self.default_encoding());
        }
        self.executable().start(arguments, &options)
    }
}

// ============================================================================
// Native
// ============================================================================

/// Runs the host's git directly.
#[derive(Debug, Clone)]
pub struct NativeGitCommandRunner {
    executable: Executable,
    encoding: &'static Encoding,
}

impl NativeGitCommandRunner {
    #[must_use]
    pub fn new(
        git_command: impl Into<String>,
        working_dir: impl Into<PathBuf>,
        default_encoding: &'static Encoding,
    ) -> Self {
        Self {
            executable: Executable::new(git_command, working_dir),
            encoding: default_encoding,
        }
    }
}

impl GitCommandRunner for NativeGitCommandRunner {
    fn mode(&self) -> RunnerMode {
        RunnerMode::Native
    }

    fn executable(&self) -> &Executable {
        &self.executable
    }

    fn default_encoding(&self) -> &'static Encoding {
        self.encoding
    }
}

// ============================================================================
// WSL
// ============================================================================

/// Runs git inside the WSL distro that owns the working directory.
#[derive(Debug, Clone)]
pub struct WslGitCommandRunner {
    executable: Executable,
    filter: Arc<WslArgumentFilter>,
    encoding: &'static Encoding,
}

impl WslGitCommandRunner {
    /// Build a runner for a `\\wsl$\<distro>\...` working directory.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Translation`] when the directory is not inside a
    /// distro.
    pub fn try_create(
        host_working_dir: &str,
        default_encoding: &'static Encoding,
    ) -> Result<Self, RunnerError> {
        let context = TranslationContext::try_new(host_working_dir)?;
        let filter = Arc::new(WslArgumentFilter::new(context));
        let executable = Executable::with_cached_program(&WSL_LAUNCHER, host_working_dir)
            .with_filter(filter.clone());

        tracing::debug!(
            distro = filter.context().distro(),
            working_dir = filter.context().working_dir(),
            "WSL runner created"
        );

        Ok(Self {
            executable,
            filter,
            encoding: default_encoding,
        })
    }

    /// Use an explicit launcher instead of the located `wsl.exe`.
    #[must_use]
    pub fn with_launcher(mut self, launcher: impl AsRef<Path>) -> Self {
        let launcher = launcher.as_ref().to_string_lossy().into_owned();
        self.executable = Executable::new(launcher, self.executable.working_dir())
            .with_filter(self.filter.clone());
        self
    }

    /// Run a different program inside the distro (default `git`).
    #[must_use]
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.filter = Arc::new(self.filter.as_ref().clone().with_tool(tool));
        self.executable = self.executable.with_filter(self.filter.clone());
        self
    }

    #[must_use]
    pub fn context(&self) -> &TranslationContext {
        self.filter.context()
    }

    #[must_use]
    pub fn filter(&self) -> &WslArgumentFilter {
        &self.filter
    }

}

impl GitCommandRunner for WslGitCommandRunner {
    fn mode(&self) -> RunnerMode {
        RunnerMode::Wsl
    }

    fn join_arguments(&self, args: &[String]) -> String {
        join_wsl_arguments(args)
    }

    /// The launcher must be an existing file or resolvable on `PATH`.
    fn check_available(&self) -> Result<(), RunnerError> {
        let launcher = self.executable.program_path();
        if launcher.is_file() || which::which(launcher).is_ok() {
            Ok(())
        } else {
            Err(RunnerError::WslNotAvailable {
                reason: format!("launcher '{}' not found", launcher.display()),
            })
        }
    }

    fn executable(&self) -> &Executable {
        &self.executable
    }

    fn default_encoding(&self) -> &'static Encoding {
        self.encoding
    }
}

// ============================================================================
// Runner selection
// ============================================================================

/// Everything runner selection needs besides the working directory.
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    pub git_command: String,
    /// Explicit `wsl.exe`; `None` locates it once per process
    pub wsl_launcher: Option<PathBuf>,
    pub wsl_tool: String,
    pub encoding: &'static Encoding,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            git_command: DEFAULT_GIT_COMMAND.to_string(),
            wsl_launcher: None,
            wsl_tool: DEFAULT_WSL_TOOL.to_string(),
            encoding: encoding_rs::UTF_8,
        }
    }
}

impl RunnerSettings {
    /// # Errors
    ///
    /// Returns [`RunnerError::ConfigurationInvalid`] for blank program names.
    pub fn validate(&self) -> Result<(), RunnerError> {
        if self.git_command.trim().is_empty() {
            return Err(RunnerError::ConfigurationInvalid {
                reason: "git command must not be empty".to_string(),
            });
        }
        if self.wsl_tool.trim().is_empty() {
            return Err(RunnerError::ConfigurationInvalid {
                reason: "WSL tool must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Pick the runner for `working_dir`.
    ///
    /// `Auto` selects WSL for `\\wsl$\` directories and native git otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::ConfigurationInvalid`] for invalid settings and
    /// [`RunnerError::Translation`] when `Wsl` is forced on a directory outside
    /// any distro.
    pub fn runner_for(
        &self,
        working_dir: &Path,
        mode: RunnerMode,
    ) -> Result<Box<dyn GitCommandRunner>, RunnerError> {
        self.validate()?;

        let host_dir = host_path_string(working_dir);
        let use_wsl = match mode {
            RunnerMode::Native => false,
            RunnerMode::Wsl => true,
            RunnerMode::Auto => is_nested_path(&host_dir),
        };

        if use_wsl {
            let mut runner = WslGitCommandRunner::try_create(&host_dir, self.encoding)?;
            if self.wsl_tool != DEFAULT_WSL_TOOL {
                runner = runner.with_tool(&self.wsl_tool);
            }
            if let Some(ref launcher) = self.wsl_launcher {
                runner = runner.with_launcher(launcher);
            }
            Ok(Box::new(runner))
        } else {
            Ok(Box::new(NativeGitCommandRunner::new(
                &self.git_command,
                working_dir,
                self.encoding,
            )))
        }
    }
}

/// Pick the runner for `working_dir` with default settings.
///
/// # Errors
///
/// See [`RunnerSettings::runner_for`].
pub fn runner_for(
    working_dir: &Path,
    mode: RunnerMode,
) -> Result<Box<dyn GitCommandRunner>, RunnerError> {
    RunnerSettings::default().runner_for(working_dir, mode)
}

/// Working directory as text, without the `\\?\` verbatim prefix on Windows.
fn host_path_string(path: &Path) -> String {
    #[cfg(windows)]
    let path = dunce::simplified(path);

    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranslationError;

    const UBUNTU_REPO: &str = r"\\wsl$\Ubuntu\home\user\repo";

    #[test]
    fn test_auto_picks_native_for_plain_directories() {
        let runner = runner_for(Path::new("/home/user/repo"), RunnerMode::Auto).unwrap();
        assert_eq!(runner.mode(), RunnerMode::Native);
        assert_eq!(runner.prepare(Some("status")).arguments, "status");
    }

    #[test]
    fn test_auto_picks_wsl_for_distro_directories() {
        let runner = runner_for(Path::new(UBUNTU_REPO), RunnerMode::Auto).unwrap();
        assert_eq!(runner.mode(), RunnerMode::Wsl);
        assert_eq!(
            runner.prepare(Some("status")).arguments,
            "-d Ubuntu -- git -C '/home/user/repo' status"
        );
    }

    #[test]
    fn test_native_mode_ignores_distro_prefix() {
        let runner = runner_for(Path::new(UBUNTU_REPO), RunnerMode::Native).unwrap();
        assert_eq!(runner.mode(), RunnerMode::Native);
    }

    #[test]
    fn test_forced_wsl_outside_distro_fails() {
        let err = runner_for(Path::new("/tmp/repo"), RunnerMode::Wsl).unwrap_err();
        assert!(matches!(
            err,
            RunnerError::Translation(TranslationError::NotNestedPath { .. })
        ));
    }

    #[test]
    fn test_try_create_rejects_short_identifier() {
        let err = WslGitCommandRunner::try_create(r"\\wsl$\U\repo", encoding_rs::UTF_8).unwrap_err();
        assert!(matches!(
            err,
            RunnerError::Translation(TranslationError::MissingIdentifier { .. })
        ));
    }

    #[test]
    fn test_wsl_runner_keeps_host_working_dir() {
        let runner = WslGitCommandRunner::try_create(UBUNTU_REPO, encoding_rs::UTF_8).unwrap();
        assert_eq!(runner.executable().working_dir(), Path::new(UBUNTU_REPO));
        assert_eq!(runner.context().distro(), "Ubuntu");
    }

    #[test]
    fn test_explicit_launcher_and_tool() {
        let settings = RunnerSettings {
            wsl_launcher: Some(PathBuf::from("/opt/wsl/wsl-shim")),
            wsl_tool: "/usr/bin/git".to_string(),
            ..RunnerSettings::default()
        };
        let runner = settings
            .runner_for(Path::new(UBUNTU_REPO), RunnerMode::Auto)
            .unwrap();
        let prepared = runner.prepare(Some("log"));
        assert_eq!(prepared.program, PathBuf::from("/opt/wsl/wsl-shim"));
        assert_eq!(
            prepared.arguments,
            "-d Ubuntu -- /usr/bin/git -C '/home/user/repo' log"
        );
    }

    #[test]
    fn test_missing_launcher_is_not_available() {
        let runner = WslGitCommandRunner::try_create(UBUNTU_REPO, encoding_rs::UTF_8)
            .unwrap()
            .with_launcher("/nonexistent/gitrun/wsl.exe");
        assert!(matches!(
            runner.check_available(),
            Err(RunnerError::WslNotAvailable { .. })
        ));
    }

    #[test]
    fn test_native_runner_is_always_available() {
        let runner = runner_for(Path::new("/repo"), RunnerMode::Native).unwrap();
        assert!(runner.check_available().is_ok());
    }

    #[test]
    fn test_join_arguments_follows_runner() {
        let args = vec!["commit".to_string(), "-m".to_string(), "two words".to_string()];

        let native = runner_for(Path::new("/repo"), RunnerMode::Native).unwrap();
        let line = native.join_arguments(&args);
        #[cfg(not(windows))]
        assert_eq!(line, "commit -m 'two words'");
        #[cfg(windows)]
        assert_eq!(line, r#"commit -m "two words""#);

        let wsl = runner_for(Path::new(UBUNTU_REPO), RunnerMode::Auto).unwrap();
        assert_eq!(wsl.join_arguments(&args), r#"commit -m "two words""#);
    }

    #[test]
    fn test_blank_git_command_is_invalid() {
        let settings = RunnerSettings {
            git_command: "  ".to_string(),
            ..RunnerSettings::default()
        };
        assert!(matches!(
            settings.runner_for(Path::new("/repo"), RunnerMode::Auto),
            Err(RunnerError::ConfigurationInvalid { .. })
        ));
    }

    #[test]
    fn test_default_encoding_is_reported() {
        let runner = NativeGitCommandRunner::new("git", "/repo", encoding_rs::WINDOWS_1252);
        assert_eq!(runner.default_encoding(), encoding_rs::WINDOWS_1252);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_detached_fills_in_default_encoding() {
        let runner = NativeGitCommandRunner::new("sh", std::env::temp_dir(), encoding_rs::WINDOWS_1252);
        let mut handle = runner
            .run_detached(Some("-c true"), StartOptions::redirected())
            .unwrap();
        assert_eq!(handle.encoding(), encoding_rs::WINDOWS_1252);
        handle.wait().await.unwrap();
    }
}
