//! Output chunk classification
//!
//! git reports transfer progress by rewriting one terminal line with `\r`.
//! Those refreshes are progress, not transcript material.

/// Erase-to-end-of-line sequence git emits after remote messages.
pub const ANSI_ERASE_LINE: &str = "\x1b[K";

/// Marker of the object counting phase, which carries no percentage.
const COUNTING_OBJECTS: &str = "remote: Counting objects";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// A progress refresh; shown transiently, never recorded
    Progress,
    /// One visual line of output
    Line,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEvent {
    pub kind: OutputKind,
    pub text: String,
}

/// Classify one chunk of decoded output.
///
/// Chunks containing `%` or `remote: Counting objects` are progress and are
/// returned untouched. Anything else is a line with [`ANSI_ERASE_LINE`]
/// removed.
#[must_use]
pub fn classify(chunk: &str) -> OutputEvent {
    if chunk.contains('%') || chunk.contains(COUNTING_OBJECTS) {
        OutputEvent {
            kind: OutputKind::Progress,
            text: chunk.to_string(),
        }
    } else {
        OutputEvent {
            kind: OutputKind::Line,
            text: chunk.replace(ANSI_ERASE_LINE, ""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentages_are_progress() {
        let event = classify("Receiving objects:  45% (450/1000)");
        assert_eq!(event.kind, OutputKind::Progress);
        assert_eq!(event.text, "Receiving objects:  45% (450/1000)");
    }

    #[test]
    fn test_counting_objects_is_progress() {
        assert_eq!(
            classify("remote: Counting objects: 1234, done.").kind,
            OutputKind::Progress
        );
    }

    #[test]
    fn test_lines_lose_erase_sequence() {
        let event = classify("remote: Compressing\x1b[K");
        assert_eq!(event.kind, OutputKind::Line);
        assert_eq!(event.text, "remote: Compressing");
    }

    #[test]
    fn test_progress_keeps_erase_sequence() {
        let event = classify("Resolving deltas: 100% (3/3), done.\x1b[K");
        assert_eq!(event.kind, OutputKind::Progress);
        assert!(event.text.ends_with(ANSI_ERASE_LINE));
    }

    #[test]
    fn test_plain_line() {
        assert_eq!(
            classify("On branch main"),
            OutputEvent {
                kind: OutputKind::Line,
                text: "On branch main".to_string()
            }
        );
    }
}
