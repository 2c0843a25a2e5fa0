//! Process sessions for gitrun
//!
//! A [`ProcessSession`] runs one git command: it launches the process with
//! redirected output, splits and decodes both streams as they arrive, tells
//! progress refreshes apart from real lines, keeps a transcript, supports a
//! cooperative abort that kills the process tree and releases index locks, and
//! settles a single verdict through an overridable [`ExitPolicy`].
//!
//! Everything observable happens on the owner context: the pump and the exit
//! watcher only post [`SessionMessage`]s.

pub mod cleanup;
pub mod error;
pub mod event;
pub mod lifecycle;
pub mod owner;
pub mod policy;
pub mod pump;
pub mod sink;
pub mod transcript;

pub use cleanup::{AdvisoryOutcome, IndexLockRelease};
pub use error::SessionError;
pub use event::{ANSI_ERASE_LINE, OutputEvent, OutputKind, classify};
pub use lifecycle::{
    ABORTED_SENTINEL, AbortHandle, ProcessSession, SessionOutcome, SessionState, Verdict,
    is_operation_aborted,
};
pub use owner::{Inbox, Mailbox, OwnerContext, SessionMessage, mailbox};
pub use policy::{DefaultExitPolicy, ExitDecision, ExitPolicy, SessionExit};
pub use pump::{ChunkSplitter, OutputPump};
pub use sink::{NullSink, SessionSink};
pub use transcript::Transcript;
