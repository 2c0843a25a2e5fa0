//! Terminal rendering for a running session
//!
//! Progress refreshes overwrite one line on stderr; output lines go to stdout.

use crossterm::cursor::MoveToColumn;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use gitrun_session::{SessionSink, Verdict};

/// [`SessionSink`] that writes to the terminal.
#[derive(Debug)]
pub struct ConsoleSink {
    /// Keep stdout clean (used for `--json`)
    quiet: bool,
    show_progress: bool,
    progress_visible: AtomicBool,
}

impl ConsoleSink {
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            show_progress: std::io::stderr().is_terminal(),
            progress_visible: AtomicBool::new(false),
        }
    }

    fn clear_progress(&self) {
        if self.progress_visible.swap(false, Ordering::SeqCst) {
            let mut stderr = std::io::stderr().lock();
            let _ = crossterm::execute!(stderr, MoveToColumn(0), Clear(ClearType::CurrentLine));
        }
    }
}

impl SessionSink for ConsoleSink {
    fn on_command_line(&self, line: &str) {
        if !self.quiet {
            eprintln!("$ {line}");
        }
    }

    fn on_progress(&self, text: &str) {
        if !self.show_progress {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = crossterm::execute!(
            stderr,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(text)
        );
        let _ = stderr.flush();
        self.progress_visible.store(true, Ordering::SeqCst);
    }

    fn on_line(&self, line: &str) {
        self.clear_progress();
        if !self.quiet {
            let mut stdout = std::io::stdout().lock();
            let _ = writeln!(stdout, "{line}");
        }
    }

    fn on_finished(&self, _verdict: Verdict, _aborted: bool) {
        self.clear_progress();
    }
}
