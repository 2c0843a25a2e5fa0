//! Run command implementation
//!
//! Handles `gitrun run` and `gitrun run --json`.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tracing::Instrument;

use gitrun_config::Config;
use gitrun_runner::CommandInvocation;
use gitrun_session::{AbortHandle, ProcessSession, SessionExit, SessionOutcome, mailbox};
use gitrun_utils::exit_codes::ExitCode;
use gitrun_utils::logging::command_span;

use super::common::{build_runner, raw_arguments};
use crate::cli::console::ConsoleSink;
use crate::error::GitrunError;
use crate::summary::RunSummary;

/// Execute the run command
pub async fn execute_run_command(
    config: &Config,
    working_dir: &Path,
    args: &[String],
    json: bool,
    dry_run: bool,
) -> Result<ExitCode> {
    let runner = build_runner(config, working_dir)?;
    let arguments = raw_arguments(runner.as_ref(), args);

    if dry_run {
        let prepared = runner.prepare(arguments.as_deref());
        println!("{}", prepared.display_line());
        return Ok(ExitCode::SUCCESS);
    }

    runner.check_available().map_err(GitrunError::from)?;

    let mut invocation = CommandInvocation::for_runner(runner.as_ref());
    if let Some(arguments) = &arguments {
        invocation = invocation.arguments(arguments.as_str());
    }
    let command = invocation.display_line();
    let span = command_span(invocation.program_name(), runner.mode().as_str());

    let (mailbox, inbox) = mailbox();
    let session = ProcessSession::new(invocation, mailbox.into_owner())
        .with_sink(Arc::new(ConsoleSink::new(json)));

    let started_at = Utc::now();

    let outcome = async {
        session.start().map_err(GitrunError::from)?;
        let interrupt = tokio::spawn(abort_on_interrupt(session.abort_handle()));
        let outcome = session.run(inbox).await;
        interrupt.abort();
        Ok::<_, anyhow::Error>(outcome)
    }
    .instrument(span)
    .await?;

    let finished_at = Utc::now();

    if json {
        let summary = RunSummary::new(
            command,
            working_dir,
            runner.mode(),
            &outcome,
            started_at,
            finished_at,
        );
        println!("{}", summary.to_json().context("Failed to emit run summary JSON")?);
    } else {
        report_outcome(&outcome);
    }

    Ok(exit_code_of(&outcome))
}

/// Abort the session on every Ctrl-C until it is gone.
async fn abort_on_interrupt(handle: AbortHandle) {
    while tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("interrupt received, aborting git");
        if !handle.abort() {
            break;
        }
    }
}

fn report_outcome(outcome: &SessionOutcome) {
    if outcome.aborted {
        eprintln!("✗ Aborted");
    } else if !outcome.verdict.is_success() {
        match outcome.exit {
            Some(SessionExit::Exited(code)) => eprintln!("✗ git exited with code {code}"),
            _ => eprintln!("✗ git was terminated"),
        }
    }
}

/// Exit code for the CLI process: git's own code on failure.
#[must_use]
pub fn exit_code_of(outcome: &SessionOutcome) -> ExitCode {
    if outcome.aborted {
        return ExitCode::ABORTED;
    }
    if outcome.verdict.is_success() {
        return ExitCode::SUCCESS;
    }
    match outcome.exit {
        Some(SessionExit::Exited(code)) if code != 0 => ExitCode::from_git(Some(code)),
        _ => ExitCode::INTERNAL,
    }
}
