// Layer 1: Standard library imports

// Layer 2: Third-party crate imports
use tokio::sync::mpsc;

// Layer 3: Internal module imports
use super::traits::MailboxError;
use crate::message::Envelope;

/// The receiving half of an actor's mailbox: a bounded FIFO queue.
///
/// There is only one backpressure behavior in this runtime: `send` blocks
/// once the queue is full rather than erroring, dropping, or branching on a
/// configurable strategy. `tokio::sync::mpsc` already does this natively,
/// so `MailboxSender::send` is a thin, direct wrapper.
pub struct Mailbox {
    receiver: mpsc::Receiver<Envelope>,
    capacity: usize,
}

/// The sending half, cloneable so every holder of an `ActorRef` can enqueue
/// without contending on a single handle.
#[derive(Clone)]
pub struct MailboxSender {
    sender: mpsc::Sender<Envelope>,
    capacity: usize,
}

/// Create a bounded mailbox pair with the given capacity.
pub fn channel(capacity: usize) -> (Mailbox, MailboxSender) {
    let (sender, receiver) = mpsc::channel(capacity);
    (
        Mailbox { receiver, capacity },
        MailboxSender { sender, capacity },
    )
}

impl Mailbox {
    /// Receive the next envelope, or `None` once every sender has dropped.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.receiver.recv().await
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl MailboxSender {
    /// Enqueue an envelope, awaiting free space if the mailbox is full.
    pub async fn send(&self, envelope: Envelope) -> Result<(), MailboxError> {
        self.sender
            .send(envelope)
            .await
            .map_err(|_| MailboxError::Closed)
    }

    /// Enqueue without waiting; fails immediately if full or closed.
    pub fn try_send(&self, envelope: Envelope) -> Result<(), MailboxError> {
        self.sender.try_send(envelope).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => MailboxError::Full {
                capacity: self.capacity,
            },
            mpsc::error::TrySendError::Closed(_) => MailboxError::Closed,
        })
    }

    /// True once the mailbox's receiver has been dropped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
