//! Translate command implementation
//!
//! Handles `gitrun translate`: shows the launcher and the filtered argument
//! line for a directory without starting anything.

use anyhow::Result;
use std::path::Path;

use gitrun_config::Config;
use gitrun_runner::GitCommandRunner;

use super::common::{build_runner, raw_arguments};

/// Execute the translate command
pub fn execute_translate_command(config: &Config, working_dir: &Path, args: &[String]) -> Result<()> {
    let runner = build_runner(config, working_dir)?;
    let arguments = raw_arguments(runner.as_ref(), args);
    print!("{}", render_translation(runner.as_ref(), arguments.as_deref()));
    Ok(())
}

fn render_translation(runner: &dyn GitCommandRunner, arguments: Option<&str>) -> String {
    let prepared = runner.prepare(arguments);
    format!(
        "mode:      {}\nlauncher:  {}\narguments: {}\n",
        runner.mode(),
        prepared.program.display(),
        prepared.arguments,
    )
}
