//! Advisory cleanup after an abort
//!
//! A killed git can leave `index.lock` behind, which blocks every later
//! command in the repository. Removing it is best effort: outcomes are
//! reported and logged, never raised.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const INDEX_LOCK: &str = "index.lock";

/// Result of a best-effort step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisoryOutcome {
    Completed,
    Failed { reason: String },
}

impl AdvisoryOutcome {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Log a failure at `warn`; completed steps are logged at `debug`.
    pub fn log(&self, step: &str) {
        match self {
            Self::Completed => tracing::debug!(step, "cleanup step completed"),
            Self::Failed { reason } => tracing::warn!(step, %reason, "cleanup step failed"),
        }
    }
}

impl From<io::Result<()>> for AdvisoryOutcome {
    fn from(result: io::Result<()>) -> Self {
        match result {
            Ok(()) => Self::Completed,
            Err(err) => Self::Failed {
                reason: err.to_string(),
            },
        }
    }
}

/// Removes `index.lock` from a repository and all of its submodules.
#[derive(Debug, Clone)]
pub struct IndexLockRelease {
    working_dir: PathBuf,
}

impl IndexLockRelease {
    #[must_use]
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    /// The repository's git directory: `.git` itself, or the target of a
    /// `gitdir:` file as found in worktrees and submodule checkouts.
    #[must_use]
    pub fn git_dir(&self) -> Option<PathBuf> {
        let dot_git = self.working_dir.join(".git");
        if dot_git.is_dir() {
            return Some(dot_git);
        }

        let content = fs::read_to_string(&dot_git).ok()?;
        let target = content
            .lines()
            .find_map(|line| line.strip_prefix("gitdir:"))?
            .trim();
        let target = Path::new(target);
        Some(if target.is_absolute() {
            target.to_path_buf()
        } else {
            self.working_dir.join(target)
        })
    }

    /// Every existing lock file: the repository's and each submodule's.
    #[must_use]
    pub fn lock_files(&self) -> Vec<PathBuf> {
        let Some(git_dir) = self.git_dir() else {
            return Vec::new();
        };

        let mut locks = Vec::new();
        let lock = git_dir.join(INDEX_LOCK);
        if lock.is_file() {
            locks.push(lock);
        }
        collect_submodule_locks(&git_dir.join("modules"), &mut locks);
        locks
    }

    /// Delete every lock file found. A lock that vanishes meanwhile is fine.
    pub fn release(&self) -> AdvisoryOutcome {
        let failures: Vec<String> = self
            .lock_files()
            .into_iter()
            .filter_map(|lock| match fs::remove_file(&lock) {
                Ok(()) => {
                    tracing::debug!(path = %lock.display(), "removed index lock");
                    None
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => None,
                Err(err) => Some(format!("{}: {err}", lock.display())),
            })
            .collect();

        if failures.is_empty() {
            AdvisoryOutcome::Completed
        } else {
            AdvisoryOutcome::Failed {
                reason: failures.join("; "),
            }
        }
    }
}

/// Walk `modules/`. A directory with a `HEAD` is a submodule git dir and may
/// nest its own `modules/`; anything else is a path segment of a submodule
/// name containing `/`.
fn collect_submodule_locks(modules_dir: &Path, locks: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(modules_dir) else {
        return;
    };

    for entry in entries.flatten() {
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }

        if dir.join("HEAD").is_file() {
            let lock = dir.join(INDEX_LOCK);
            if lock.is_file() {
                locks.push(lock);
            }
            collect_submodule_locks(&dir.join("modules"), locks);
        } else {
            collect_submodule_locks(&dir, locks);
        }
    }
}
