//! Exit handling policy
//!
//! When git exits (or the session is aborted) the session computes a default
//! `is_error` and asks the [`ExitPolicy`] for the final word. A policy can
//! rewrite `is_error`, or claim the exit as handled to defer finalisation
//! until it calls `ProcessSession::complete` itself.

use std::panic::{AssertUnwindSafe, catch_unwind};

/// How a session's process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionExit {
    /// Exited on its own with this code
    Exited(i32),
    /// Died without an exit code
    Killed,
    /// Aborted by the caller
    Aborted,
}

impl SessionExit {
    #[must_use]
    pub const fn code(self) -> Option<i32> {
        match self {
            Self::Exited(code) => Some(code),
            Self::Killed | Self::Aborted => None,
        }
    }

    /// Default error classification: any non-zero code, a kill or an abort.
    #[must_use]
    pub const fn is_error(self) -> bool {
        !matches!(self, Self::Exited(0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitDecision {
    pub is_error: bool,
    /// Finalisation is deferred to a later `complete` call
    pub handled: bool,
}

impl ExitDecision {
    #[must_use]
    pub const fn finalize(is_error: bool) -> Self {
        Self {
            is_error,
            handled: false,
        }
    }

    #[must_use]
    pub const fn defer(is_error: bool) -> Self {
        Self {
            is_error,
            handled: true,
        }
    }
}

/// Decides how an exit is reported.
pub trait ExitPolicy: Send + Sync {
    /// `is_error` is the default classification. Returning an error is the
    /// same as returning `is_error = true` without deferring.
    fn decide(&self, exit: SessionExit, is_error: bool) -> anyhow::Result<ExitDecision>;
}

impl<F> ExitPolicy for F
where
    F: Fn(SessionExit, bool) -> anyhow::Result<ExitDecision> + Send + Sync,
{
    fn decide(&self, exit: SessionExit, is_error: bool) -> anyhow::Result<ExitDecision> {
        self(exit, is_error)
    }
}

/// Keeps the default classification and finalises immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExitPolicy;

impl ExitPolicy for DefaultExitPolicy {
    fn decide(&self, _exit: SessionExit, is_error: bool) -> anyhow::Result<ExitDecision> {
        Ok(ExitDecision::finalize(is_error))
    }
}

/// Run the policy; failures and panics turn into a finalised error.
pub(crate) fn decide_guarded(
    policy: &dyn ExitPolicy,
    exit: SessionExit,
    is_error: bool,
) -> ExitDecision {
    match catch_unwind(AssertUnwindSafe(|| policy.decide(exit, is_error))) {
        Ok(Ok(decision)) => decision,
        Ok(Err(err)) => {
            tracing::warn!(?exit, error = %err, "exit policy failed; reporting error");
            ExitDecision::finalize(true)
        }
        Err(_) => {
            tracing::warn!(?exit, "exit policy panicked; reporting error");
            ExitDecision::finalize(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_classification() {
        assert!(!SessionExit::Exited(0).is_error());
        assert!(SessionExit::Exited(128).is_error());
        assert!(SessionExit::Killed.is_error());
        assert!(SessionExit::Aborted.is_error());
        assert_eq!(SessionExit::Exited(3).code(), Some(3));
        assert_eq!(SessionExit::Aborted.code(), None);
    }

    #[test]
    fn test_default_policy_passes_through() {
        let decision = decide_guarded(&DefaultExitPolicy, SessionExit::Exited(1), true);
        assert_eq!(decision, ExitDecision::finalize(true));
    }

    #[test]
    fn test_closure_policy_can_rewrite() {
        // git diff --exit-code returns 1 for "differences found"
        let policy = |exit: SessionExit, is_error: bool| -> anyhow::Result<ExitDecision> {
            Ok(ExitDecision::finalize(is_error && exit != SessionExit::Exited(1)))
        };
        let decision = decide_guarded(&policy, SessionExit::Exited(1), true);
        assert!(!decision.is_error);
    }

    #[test]
    fn test_failing_policy_is_error() {
        let policy = |_: SessionExit, _: bool| -> anyhow::Result<ExitDecision> {
            anyhow::bail!("hook exploded")
        };
        let decision = decide_guarded(&policy, SessionExit::Exited(0), false);
        assert_eq!(decision, ExitDecision::finalize(true));
    }

    #[test]
    fn test_panicking_policy_is_error() {
        let policy = |_: SessionExit, _: bool| -> anyhow::Result<ExitDecision> {
            panic!("hook panicked")
        };
        let decision = decide_guarded(&policy, SessionExit::Exited(0), false);
        assert_eq!(decision, ExitDecision::finalize(true));
    }
}
