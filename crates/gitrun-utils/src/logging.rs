//! Logging setup for gitrun
//!
//! Diagnostics go through `tracing`. Binaries call [`init_tracing`] once at
//! startup; libraries only emit events.

use std::io::IsTerminal;
use tracing::{Level, span};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Check if colored output should be used.
///
/// Returns true only if:
/// - stdout is a terminal (TTY)
/// - NO_COLOR environment variable is not set
fn use_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Filter directive used when `RUST_LOG` is not set.
#[must_use]
pub const fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "gitrun=debug,gitrun_runner=debug,gitrun_session=debug,info"
    } else {
        "gitrun=info,warn"
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `verbose` selects between debug output
/// for the gitrun crates (with targets and span close timings) and a compact
/// info-level format. Events go to stderr so stdout stays clean for git output.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(use_color())
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false);

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                layer
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer.with_target(false).compact())
            .try_init()?;
    }

    Ok(())
}

/// Span covering one git command from launch to finalisation.
pub fn command_span(program: &str, runner_mode: &str) -> tracing::Span {
    span!(
        Level::INFO,
        "git_command",
        program = %program,
        runner_mode = %runner_mode,
    )
}
