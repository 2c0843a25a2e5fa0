//! Helpers shared by the command implementations

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use gitrun_config::Config;
use gitrun_runner::GitCommandRunner;

use crate::error::GitrunError;

/// The raw argument line for `runner`, or `None` for an empty argument list.
#[must_use]
pub fn raw_arguments(runner: &dyn GitCommandRunner, args: &[String]) -> Option<String> {
    if args.is_empty() {
        None
    } else {
        Some(runner.join_arguments(args))
    }
}

/// The directory a command works in: the given one, else the current one.
pub fn resolve_working_dir(dir: Option<&Path>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir().context("Failed to get current directory"),
    }
}

/// Runner picked by the effective configuration for `working_dir`.
pub fn build_runner(config: &Config, working_dir: &Path) -> Result<Box<dyn GitCommandRunner>> {
    let settings = config.runner_settings().map_err(GitrunError::from)?;
    let mode = config.runner_mode().map_err(GitrunError::from)?;
    let runner = settings
        .runner_for(working_dir, mode)
        .map_err(GitrunError::from)?;
    tracing::debug!(
        requested = %mode,
        selected = %runner.mode(),
        program = %runner.executable().program_path().display(),
        "runner selected"
    );
    Ok(runner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_raw_arguments_empty_is_none() {
        let runner = build_runner(&Config::default(), Path::new("/tmp")).unwrap();
        assert_eq!(raw_arguments(runner.as_ref(), &[]), None);
        assert_eq!(
            raw_arguments(runner.as_ref(), &args(&["status"])).as_deref(),
            Some("status")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_native_raw_arguments_survive_launch_splitting() {
        let runner = build_runner(&Config::default(), Path::new("/tmp")).unwrap();
        let typed = args(&["log", r"--grep=\bfix", "--author=O'Brien", "--grep", "a b", r#"x"y"#]);
        let line = raw_arguments(runner.as_ref(), &typed);
        assert_eq!(runner.prepare(line.as_deref()).argv(), typed);
    }

    #[test]
    fn test_wsl_raw_arguments_use_double_quotes() {
        let runner = build_runner(&Config::default(), Path::new(r"\\wsl$\Ubuntu\home\me\repo")).unwrap();
        assert_eq!(
            raw_arguments(runner.as_ref(), &args(&["commit", "-m", "two words"])).as_deref(),
            Some(r#"commit -m "two words""#)
        );
    }

    #[test]
    fn test_build_runner_uses_wsl_for_nested_paths() {
        let config = Config::default();
        let runner = build_runner(&config, Path::new(r"\\wsl$\Ubuntu\home\me\repo")).unwrap();
        assert_eq!(runner.mode(), gitrun_runner::RunnerMode::Wsl);

        let runner = build_runner(&config, Path::new("/tmp")).unwrap();
        assert_eq!(runner.mode(), gitrun_runner::RunnerMode::Native);
    }
}
