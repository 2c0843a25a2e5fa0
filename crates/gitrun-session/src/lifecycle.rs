//! Process session lifecycle
//!
//! ```text
//! NotStarted ──start──▶ Running ──exit──▶ Exited ──┐
//!                          │                       ├──▶ Finalized
//!                          └────abort────▶ Aborted ┘
//! ```
//!
//! Exit and abort race; whichever moves the session out of `Running` first
//! wins and the other is ignored. Exit handling and finalisation each run at
//! most once.
//!
//! `start` holds the session in an internal starting state until the kill
//! switch is stored. An abort arriving in that window only marks the session
//! aborted; `start` kills the child and completes the abort once it exists.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;
use tracing::Instrument;

use gitrun_runner::{CommandInvocation, Executable, KillSwitch, ProcessState, StartOptions};

use crate::cleanup::{AdvisoryOutcome, IndexLockRelease};
use crate::error::SessionError;
use crate::owner::{Inbox, OwnerContext, SessionMessage};
use crate::policy::{DefaultExitPolicy, ExitPolicy, SessionExit, decide_guarded};
use crate::pump::OutputPump;
use crate::sink::{NullSink, SessionSink};
use crate::transcript::Transcript;

/// Transcript line recorded when a session is aborted.
pub const ABORTED_SENTINEL: &str = "Aborted";

/// Whether `output` is the text of an aborted session.
#[must_use]
pub fn is_operation_aborted(output: &str) -> bool {
    output.trim_matches(['\r', '\n']) == ABORTED_SENTINEL
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failure,
}

impl Verdict {
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl From<bool> for Verdict {
    fn from(success: bool) -> Self {
        if success { Self::Success } else { Self::Failure }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Running,
    Exited,
    Aborted,
    Finalized,
}

const NOT_STARTED: u8 = 0;
const RUNNING: u8 = 1;
const EXITED: u8 = 2;
const ABORTED: u8 = 3;
const STARTING: u8 = 4;

/// What a finished session reports.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub verdict: Verdict,
    pub aborted: bool,
    pub exit: Option<SessionExit>,
    pub transcript: Transcript,
}

impl SessionOutcome {
    /// The sentinel for aborted sessions, otherwise the transcript text.
    #[must_use]
    pub fn read_output(&self) -> String {
        if self.aborted {
            ABORTED_SENTINEL.to_string()
        } else {
            self.transcript.text()
        }
    }
}

/// Requests an abort through the owner context.
#[derive(Clone)]
pub struct AbortHandle {
    owner: Arc<dyn OwnerContext>,
}

impl std::fmt::Debug for AbortHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbortHandle").finish_non_exhaustive()
    }
}

impl AbortHandle {
    /// Post an abort request. Returns `false` when the owner is gone.
    pub fn abort(&self) -> bool {
        self.owner.post(SessionMessage::AbortRequested)
    }
}

/// One git command run with streamed output and cooperative abort.
///
/// Messages from the process side are handled by [`dispatch`](Self::dispatch)
/// on the owner; [`run`](Self::run) is a ready-made owner loop.
///
/// ```rust,no_run
/// use gitrun_runner::CommandInvocation;
/// use gitrun_session::{ProcessSession, mailbox};
///
/// # async fn example() -> Result<(), gitrun_session::SessionError> {
/// let (mailbox, inbox) = mailbox();
/// let session = ProcessSession::new(
///     CommandInvocation::new("/path/to/repo").arguments("fetch --progress"),
///     mailbox.into_owner(),
/// );
/// session.start()?;
/// let outcome = session.run(inbox).await;
/// println!("success: {}", outcome.verdict.is_success());
/// # Ok(())
/// # }
/// ```
pub struct ProcessSession {
    invocation: CommandInvocation,
    owner: Arc<dyn OwnerContext>,
    policy: Arc<dyn ExitPolicy>,
    sink: Arc<dyn SessionSink>,
    transcript: Transcript,
    state: AtomicU8,
    exit_handled: AtomicBool,
    deferred: AtomicBool,
    finalized: AtomicBool,
    exit: Mutex<Option<SessionExit>>,
    verdict: Mutex<Option<Verdict>>,
    kill_switch: Mutex<Option<KillSwitch>>,
    launched_line: Mutex<Option<String>>,
    finished: Notify,
}

impl std::fmt::Debug for ProcessSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessSession")
            .field("invocation", &self.invocation)
            .field("state", &self.state())
            .field("verdict", &self.verdict())
            .finish_non_exhaustive()
    }
}

impl ProcessSession {
    #[must_use]
    pub fn new(invocation: CommandInvocation, owner: Arc<dyn OwnerContext>) -> Self {
        Self {
            invocation,
            owner,
            policy: Arc::new(DefaultExitPolicy),
            sink: Arc::new(NullSink),
            transcript: Transcript::new(),
            state: AtomicU8::new(NOT_STARTED),
            exit_handled: AtomicBool::new(false),
            deferred: AtomicBool::new(false),
            finalized: AtomicBool::new(false),
            exit: Mutex::new(None),
            verdict: Mutex::new(None),
            kill_switch: Mutex::new(None),
            launched_line: Mutex::new(None),
            finished: Notify::new(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn ExitPolicy>) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn SessionSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub fn invocation(&self) -> &CommandInvocation {
        &self.invocation
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[must_use]
    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle {
            owner: self.owner.clone(),
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.finalized.load(Ordering::SeqCst) {
            return SessionState::Finalized;
        }
        match self.state.load(Ordering::SeqCst) {
            NOT_STARTED => SessionState::NotStarted,
            RUNNING | STARTING => SessionState::Running,
            EXITED => SessionState::Exited,
            _ => SessionState::Aborted,
        }
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.state.load(Ordering::SeqCst) == ABORTED
    }

    /// Final verdict, once finalised.
    #[must_use]
    pub fn verdict(&self) -> Option<Verdict> {
        *self.verdict.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn exit(&self) -> Option<SessionExit> {
        *self.exit.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The filtered command line handed to the OS, once `start` got that far.
    #[must_use]
    pub fn launched_line(&self) -> Option<String> {
        self.launched_line
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the exit policy deferred finalisation.
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        self.deferred.load(Ordering::SeqCst)
    }

    /// Launch the process. Must be called from within a Tokio runtime.
    ///
    /// A rejected stdin payload or a failed spawn is recorded in the
    /// transcript and handled as an exit with code 1 before the error is
    /// returned.
    ///
    /// # Errors
    ///
    /// * [`SessionError::AlreadyStarted`] - `start` was called before
    /// * [`SessionError::StdinNotSupported`] - the invocation carries input
    /// * [`SessionError::Spawn`] - the process could not be launched
    pub fn start(&self) -> Result<(), SessionError> {
        if self
            .state
            .compare_exchange(NOT_STARTED, STARTING, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SessionError::AlreadyStarted);
        }

        let line = self.invocation.display_line();
        tracing::info!(command = %line, working_dir = %self.invocation.working_dir().display(), "starting git");
        self.sink.on_command_line(&line);

        if self.invocation.has_input() {
            return Err(self.fail_start(SessionError::StdinNotSupported));
        }

        let mut executable =
            Executable::new(self.invocation.program_name(), self.invocation.working_dir());
        if let Some(filter) = self.invocation.argument_filter() {
            executable = executable.with_filter(filter.clone());
        }
        let prepared = executable
            .prepare(self.invocation.raw_arguments())
            .envs(self.invocation.env_overrides().clone());
        let launched = prepared.display_line();
        tracing::debug!(command = %launched, "launching filtered command");
        *self
            .launched_line
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(launched);

        let mut options = StartOptions::redirected();
        options.output_encoding = self.invocation.output_encoding();

        let mut handle = match prepared.spawn(&options) {
            Ok(handle) => handle,
            Err(err) => return Err(self.fail_start(err.into())),
        };

        let kill_switch = handle.kill_switch();
        *self
            .kill_switch
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(kill_switch.clone());
        let aborted_while_starting = self
            .state
            .compare_exchange(STARTING, RUNNING, Ordering::SeqCst, Ordering::SeqCst)
            .is_err();

        let pump = OutputPump::new(self.transcript.clone(), self.owner.clone());
        let stdout = handle.take_stdout();
        let stderr = handle.take_stderr();
        let encoding = handle.encoding();
        let owner = self.owner.clone();

        tokio::spawn(async move {
            let pump_task = tokio::spawn(pump.run(stdout, stderr, encoding));

            let code = match handle.wait().await {
                Ok(ProcessState::Exited(code)) => Some(code),
                Ok(_) => None,
                Err(err) => {
                    tracing::warn!(error = %err, "waiting for git failed");
                    None
                }
            };

            match pump_task.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => tracing::warn!(error = %err, "output pump stopped early"),
                Err(err) => tracing::warn!(error = %err, "output pump task failed"),
            }

            tracing::debug!(pid = ?handle.pid(), exit_code = ?code, "git exited");
            owner.post(SessionMessage::Exited { code });
        }
        .instrument(tracing::Span::current()));

        if aborted_while_starting {
            self.complete_abort(Some(kill_switch));
        }
        Ok(())
    }

    fn fail_start(&self, err: SessionError) -> SessionError {
        let message = err.to_string();
        tracing::warn!(error = %message, "git could not be started");
        self.transcript.append(message.clone());
        self.sink.on_line(&message);

        match self
            .state
            .compare_exchange(STARTING, EXITED, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => self.handle_exit(SessionExit::Exited(1)),
            Err(ABORTED) => self.complete_abort(None),
            Err(_) => {}
        }
        err
    }

    /// Handle one message on the owner context.
    pub fn dispatch(&self, message: SessionMessage) {
        match message {
            SessionMessage::Progress(text) => self.sink.on_progress(&text),
            SessionMessage::Line(text) => {
                if !self.sink.renders_full_output() {
                    self.sink.on_line(&text);
                }
            }
            SessionMessage::Exited { code } => self.process_exited(code),
            SessionMessage::AbortRequested => {
                self.abort();
            }
        }
    }

    fn process_exited(&self, code: Option<i32>) {
        if self
            .state
            .compare_exchange(RUNNING, EXITED, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!(exit_code = ?code, "exit after abort ignored");
            return;
        }

        let exit = code.map_or(SessionExit::Killed, SessionExit::Exited);
        self.handle_exit(exit);
    }

    /// Abort a running session: kill the process tree, release index locks,
    /// record the sentinel and run exit handling as an abort.
    ///
    /// Returns `false` (and does nothing) unless the session was running or
    /// starting. An abort during `start` is completed by `start` as soon as
    /// the process exists.
    pub fn abort(&self) -> bool {
        let previous = match self.state.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |state| {
            matches!(state, RUNNING | STARTING).then_some(ABORTED)
        }) {
            Ok(previous) => previous,
            Err(_) => return false,
        };

        if previous == STARTING {
            tracing::info!("abort requested while git is starting");
            return true;
        }

        let kill_switch = self
            .kill_switch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        self.complete_abort(kill_switch);
        true
    }

    fn complete_abort(&self, kill_switch: Option<KillSwitch>) {
        tracing::info!(pid = ?kill_switch.as_ref().and_then(KillSwitch::pid), "aborting git");
        kill_tree(kill_switch.as_ref()).log("kill process tree");

        IndexLockRelease::new(self.invocation.working_dir())
            .release()
            .log("release index lock");

        self.transcript.append(ABORTED_SENTINEL);
        self.sink.on_line(ABORTED_SENTINEL);

        self.handle_exit(SessionExit::Aborted);
    }

    fn handle_exit(&self, exit: SessionExit) {
        if self.exit_handled.swap(true, Ordering::SeqCst) {
            return;
        }
        *self.exit.lock().unwrap_or_else(PoisonError::into_inner) = Some(exit);

        let decision = decide_guarded(self.policy.as_ref(), exit, exit.is_error());
        if decision.handled {
            tracing::debug!(?exit, "exit handling deferred by policy");
            self.deferred.store(true, Ordering::SeqCst);
            self.finished.notify_one();
            return;
        }

        self.finalize(Verdict::from(!decision.is_error));
    }

    /// Finalise a session whose exit policy deferred.
    ///
    /// Returns `false` if the session was not deferred or is already final.
    pub fn complete(&self, success: bool) -> bool {
        if !self.deferred.load(Ordering::SeqCst) {
            return false;
        }
        self.finalize(Verdict::from(success))
    }

    fn finalize(&self, verdict: Verdict) -> bool {
        if self.finalized.swap(true, Ordering::SeqCst) {
            return false;
        }

        *self.verdict.lock().unwrap_or_else(PoisonError::into_inner) = Some(verdict);
        let aborted = self.is_aborted();
        tracing::info!(?verdict, aborted, exit = ?self.exit(), "git command finished");
        self.sink.on_finished(verdict, aborted);
        self.finished.notify_one();
        true
    }

    /// Owner loop: dispatch messages until the session is finalised.
    ///
    /// A deferred session keeps the loop going until
    /// [`complete`](Self::complete) is called. If the inbox closes first the
    /// verdict is reported as failure.
    pub async fn run(&self, mut inbox: Inbox) -> SessionOutcome {
        while !self.finalized.load(Ordering::SeqCst) {
            tokio::select! {
                message = inbox.recv() => match message {
                    Some(message) => self.dispatch(message),
                    None => break,
                },
                () = self.finished.notified() => {}
            }
        }

        self.outcome()
    }

    /// Snapshot of the session's result so far.
    #[must_use]
    pub fn outcome(&self) -> SessionOutcome {
        SessionOutcome {
            verdict: self.verdict().unwrap_or(Verdict::Failure),
            aborted: self.is_aborted(),
            exit: self.exit(),
            transcript: self.transcript.clone(),
        }
    }
}

/// Kill through the switch; a missing switch means no process could be reached.
fn kill_tree(kill_switch: Option<&KillSwitch>) -> AdvisoryOutcome {
    match kill_switch {
        Some(switch) => AdvisoryOutcome::from(switch.kill()),
        None => AdvisoryOutcome::Failed {
            reason: "no process handle to kill".to_string(),
        },
    }
}
