use crate::lifecycle::Verdict;

/// Presentation side of a session. Every call happens on the owner context.
///
/// All methods default to doing nothing.
pub trait SessionSink: Send + Sync {
    /// The command about to be launched, for display.
    fn on_command_line(&self, _line: &str) {}

    /// Latest progress refresh.
    fn on_progress(&self, _text: &str) {}

    /// A line of output (already recorded in the transcript).
    fn on_line(&self, _line: &str) {}

    /// The session's final verdict.
    fn on_finished(&self, _verdict: Verdict, _aborted: bool) {}

    /// Whether the sink already shows the raw process output on its own.
    ///
    /// When true, lines are still recorded in the transcript but not passed
    /// to [`on_line`](Self::on_line).
    fn renders_full_output(&self) -> bool {
        false
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SessionSink for NullSink {}
