use std::sync::{Arc, PoisonError, RwLock};

/// Append-only log of the lines a session produced.
///
/// Cloning yields another handle to the same log. The output pump appends
/// while callers read snapshots; a snapshot never sees a half-written line.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Arc<RwLock<Vec<String>>>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, line: impl Into<String>) {
        self.lines
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.into());
    }

    /// Copy of every line appended so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.lines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn last(&self) -> Option<String> {
        self.lines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// All lines joined with `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_log() {
        let transcript = Transcript::new();
        let writer = transcript.clone();
        writer.append("Fetching origin");
        writer.append("Already up to date.");

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.last().as_deref(), Some("Already up to date."));
        assert_eq!(transcript.text(), "Fetching origin\nAlready up to date.");
    }

    #[test]
    fn test_snapshot_is_detached() {
        let transcript = Transcript::new();
        transcript.append("one");
        let snapshot = transcript.snapshot();
        transcript.append("two");
        assert_eq!(snapshot, ["one"]);
        assert!(!transcript.is_empty());
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let transcript = Transcript::new();
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let transcript = transcript.clone();
                std::thread::spawn(move || {
                    for i in 0..250 {
                        transcript.append(format!("{worker}:{i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(transcript.len(), 1000);
    }
}
