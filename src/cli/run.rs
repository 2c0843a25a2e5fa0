//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Builds CliArgs and discovers Config
//! - Installs logging
//! - Creates the tokio runtime
//! - Dispatches to command handlers
//! - Handles all error output

use anyhow::Result;
use clap::Parser;

use gitrun_config::{CliArgs, Config};
use gitrun_utils::exit_codes::ExitCode;
use gitrun_utils::logging::init_tracing;

use super::args::{Cli, Commands};
use super::commands;
use crate::error::{GitrunError, exit_code_for};

/// Main CLI execution function.
///
/// Handles ALL output including errors. On success returns `Ok(())`; on error
/// or a failed git run returns the exit code for `main` to exit with.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();
    let operation = cli.command.name();

    let (mode, encoding) = match &cli.command {
        Commands::Run { mode, encoding, .. } => (mode.clone(), encoding.clone()),
        Commands::Translate { mode, .. } => (mode.clone(), None),
        Commands::Config { .. } => (None, None),
    };

    let cli_args = CliArgs {
        config_path: cli.config.clone(),
        git_command: cli.git_command.clone(),
        runner_mode: mode,
        wsl_launcher: cli.wsl_launcher.clone(),
        wsl_tool: cli.wsl_tool.clone(),
        encoding,
        verbose: cli.verbose.then_some(true),
    };

    let config = match load_config(cli.command.dir().map(|dir| dir.as_path()), &cli_args) {
        Ok(config) => config,
        Err(err) => return Err(report_error(&err, operation)),
    };

    if let Err(err) = init_tracing(config.verbose()) {
        eprintln!("✗ Failed to initialize logging: {err}");
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let result: Result<ExitCode> = rt.block_on(async {
        match cli.command {
            Commands::Run {
                dir,
                json,
                dry_run,
                args,
                ..
            } => {
                let working_dir = commands::resolve_working_dir(dir.as_deref())?;
                commands::execute_run_command(&config, &working_dir, &args, json, dry_run).await
            }
            Commands::Translate { dir, args, .. } => {
                commands::execute_translate_command(&config, &dir, &args)?;
                Ok(ExitCode::SUCCESS)
            }
            Commands::Config { json, .. } => {
                commands::execute_config_command(&config, json)?;
                Ok(ExitCode::SUCCESS)
            }
        }
    });

    // Dropping the runtime would wait for the Ctrl-C listener otherwise
    rt.shutdown_background();

    match result {
        Ok(code) if code.is_success() => Ok(()),
        Ok(code) => Err(code),
        Err(err) => Err(report_error(&err, operation)),
    }
}

fn load_config(dir: Option<&std::path::Path>, cli_args: &CliArgs) -> Result<Config> {
    match dir {
        Some(dir) if dir.is_dir() => Config::discover_from(dir, cli_args),
        _ => Config::discover(cli_args),
    }
}

/// Print `error` for the user and pick the exit code.
fn report_error(error: &anyhow::Error, operation: &str) -> ExitCode {
    if let Some(err) = error.downcast_ref::<GitrunError>() {
        eprint!("{}", err.display_for_user());
    } else {
        eprintln!("✗ {operation} failed: {error:#}");
        if let Some(suggestions) = enhance_error_context(error) {
            eprintln!("\n  Suggestions:");
            for (i, suggestion) in suggestions.iter().enumerate() {
                eprintln!("    {}. {}", i + 1, suggestion);
            }
        }
    }
    eprintln!("\n  Run with --verbose for more detailed output");

    exit_code_for(error)
}

/// Suggestions for errors that did not come from a gitrun crate.
fn enhance_error_context(error: &anyhow::Error) -> Option<Vec<&'static str>> {
    let error_str = format!("{error:#}");

    if error_str.contains("config file") || error_str.contains("configuration") {
        Some(vec![
            "Check the syntax of .gitrun/config.toml",
            "Use --config to point at a specific file",
            "Unset GITRUN_HOME to fall back to discovery",
        ])
    } else if error_str.contains("current directory") {
        Some(vec!["Pass the repository directory with -C <DIR>"])
    } else {
        None
    }
}
