//! Error types for the actor system.

use thiserror::Error;

use crate::mailbox::MailboxError;
use crate::util::ActorId;

/// Errors the `ActorSystem` and `ActorRef` can produce.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("actor {0} not found")]
    ActorNotFound(ActorId),

    #[error("mailbox error delivering to {actor_id}: {source}")]
    Mailbox {
        actor_id: ActorId,
        #[source]
        source: MailboxError,
    },

    #[error("ask to {0} timed out")]
    AskTimeout(ActorId),

    #[error("ask to {0} was dropped before a reply arrived")]
    AskCancelled(ActorId),

    #[error("remote transport error: {0}")]
    Transport(#[from] crate::remote::TransportError),

    #[error("spawn of actor {0} failed during pre_start: {1}")]
    SpawnFailed(ActorId, String),
}

/// Errors loading [`super::config::RuntimeConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),
}
