//! Marshalling onto the owner context
//!
//! The output pump and the exit watcher run on their own tasks. Everything
//! they want the caller to see is posted as a [`SessionMessage`] and handled
//! wherever the owner drains its [`Inbox`].

use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMessage {
    Progress(String),
    Line(String),
    /// Both pipes are drained and the process is gone. `None` means it died
    /// without an exit code (killed by a signal).
    Exited { code: Option<i32> },
    AbortRequested,
}

/// Somewhere session messages can be posted for later handling on the owner.
pub trait OwnerContext: Send + Sync {
    /// Queue a message. Returns `false` when the owner is gone.
    fn post(&self, message: SessionMessage) -> bool;
}

/// Sending half of a channel-backed owner context.
#[derive(Debug, Clone)]
pub struct Mailbox {
    tx: UnboundedSender<SessionMessage>,
}

/// Receiving half, drained by the owner.
#[derive(Debug)]
pub struct Inbox {
    rx: UnboundedReceiver<SessionMessage>,
}

/// Create a connected mailbox/inbox pair.
#[must_use]
pub fn mailbox() -> (Mailbox, Inbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Mailbox { tx }, Inbox { rx })
}

impl Mailbox {
    #[must_use]
    pub fn into_owner(self) -> Arc<dyn OwnerContext> {
        Arc::new(self)
    }
}

impl OwnerContext for Mailbox {
    fn post(&self, message: SessionMessage) -> bool {
        self.tx.send(message).is_ok()
    }
}

impl Inbox {
    /// Next message; `None` once every mailbox is dropped and the queue is empty.
    pub async fn recv(&mut self) -> Option<SessionMessage> {
        self.rx.recv().await
    }

    /// Next message if one is already queued.
    pub fn try_recv(&mut self) -> Option<SessionMessage> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_messages_arrive_in_post_order() {
        let (mailbox, mut inbox) = mailbox();
        assert!(mailbox.post(SessionMessage::Line("a".into())));
        assert!(mailbox.post(SessionMessage::Progress("50%".into())));
        assert!(mailbox.post(SessionMessage::Exited { code: Some(0) }));

        assert_eq!(inbox.recv().await, Some(SessionMessage::Line("a".into())));
        assert_eq!(inbox.recv().await, Some(SessionMessage::Progress("50%".into())));
        assert_eq!(
            inbox.recv().await,
            Some(SessionMessage::Exited { code: Some(0) })
        );
        assert_eq!(inbox.try_recv(), None);
    }

    #[test]
    fn test_post_after_owner_dropped_reports_false() {
        let (mailbox, inbox) = mailbox();
        drop(inbox);
        assert!(!mailbox.post(SessionMessage::AbortRequested));
    }

    #[tokio::test]
    async fn test_inbox_closes_when_mailboxes_drop() {
        let (mailbox, mut inbox) = mailbox();
        let owner = mailbox.into_owner();
        owner.post(SessionMessage::AbortRequested);
        drop(owner);
        assert_eq!(inbox.recv().await, Some(SessionMessage::AbortRequested));
        assert_eq!(inbox.recv().await, None);
    }
}
