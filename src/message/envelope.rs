// Layer 1: Standard library imports

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

// Layer 3: Internal module imports
use super::traits::{MessageKind, MessagePriority};
use crate::system::ActorRef;
use crate::util::MessageId;

/// A message in flight between actors in the same process.
///
/// `Envelope` never crosses the wire as-is: the remote transport strips it
/// down to `(target_id, id, kind)` (see `crate::remote::codec::Frame`)
/// because a live [`ActorRef`] only makes sense inside the `ActorSystem`
/// that created it.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub id: MessageId,
    pub sender: Option<ActorRef>,
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
}

impl Envelope {
    pub fn new(kind: MessageKind) -> Self {
        Self {
            id: MessageId::new(),
            sender: None,
            kind,
            timestamp: Utc::now(),
        }
    }

    pub fn with_sender(mut self, sender: ActorRef) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn priority(&self) -> MessagePriority {
        self.kind.priority()
    }
}
