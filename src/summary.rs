//! Machine-readable summary of one `gitrun run`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use gitrun_runner::RunnerMode;
use gitrun_session::{SessionExit, SessionOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryVerdict {
    Success,
    Failure,
}

/// Printed by `gitrun run --json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub command: String,
    pub working_dir: String,
    pub runner_mode: RunnerMode,
    pub verdict: SummaryVerdict,
    pub aborted: bool,
    /// git's exit code; absent when aborted or killed
    pub exit_code: Option<i32>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub transcript: Vec<String>,
}

impl RunSummary {
    #[must_use]
    pub fn new(
        command: String,
        working_dir: &Path,
        runner_mode: RunnerMode,
        outcome: &SessionOutcome,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let exit_code = match outcome.exit {
            Some(SessionExit::Exited(code)) => Some(code),
            _ => None,
        };

        Self {
            command,
            working_dir: working_dir.display().to_string(),
            runner_mode,
            verdict: if outcome.verdict.is_success() {
                SummaryVerdict::Success
            } else {
                SummaryVerdict::Failure
            },
            aborted: outcome.aborted,
            exit_code,
            started_at,
            finished_at,
            transcript: outcome.transcript.snapshot(),
        }
    }

    /// Pretty-printed JSON with RFC 3339 timestamps.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; in practice this does not fail.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
