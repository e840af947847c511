//! A cheap, cloneable handle to a (possibly remote) actor.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::errors::SystemError;
use crate::message::{Envelope, MessageKind};
use crate::monitoring::RuntimeEvent;
use crate::util::{ActorId, MessageId};

/// Object-safe surface of `ActorSystem` that `ActorRef` needs. Kept
/// separate from the concrete, monitor-generic `ActorSystem<Mon>` so a
/// reference can be handed to actors and messages without infecting them
/// with that type parameter.
#[async_trait]
pub(crate) trait SystemInternal: Send + Sync {
    async fn deliver_local(&self, target: &ActorId, envelope: Envelope) -> Result<(), SystemError>;
    async fn deliver_remote(
        &self,
        addr: SocketAddr,
        target: &ActorId,
        id: MessageId,
        kind: MessageKind,
    ) -> Result<(), SystemError>;
    /// Run the send-interception chain against `msg`, in registration
    /// order. `None` means some interceptor dropped the message; it must
    /// not be delivered.
    fn apply_send_chain(&self, target: &ActorId, msg: MessageKind) -> Option<MessageKind>;
    /// Run the receive-interception chain against `msg`, in registration
    /// order, called on mailbox dequeue before the message reaches the
    /// actor's behavior. `None` means some interceptor dropped it.
    fn apply_receive_chain(&self, target: &ActorId, msg: MessageKind) -> Option<MessageKind>;
    fn register_pending(&self, id: MessageId) -> tokio::sync::oneshot::Receiver<MessageKind>;
    /// Resolve a pending `ask` correlation id with `reply`. Returns `false`
    /// if no asker is waiting on `id` (already timed out, or `id` was never
    /// an ask).
    fn resolve_pending(&self, id: MessageId, reply: MessageKind) -> bool;
    /// Tear down `root` and its registered descendants, leaves first. Used
    /// both by `ActorSystem::stop_actor` and by the supervisor, which only
    /// holds a type-erased system handle.
    async fn stop_local(&self, root: &ActorId);
    /// Record a monitoring event through the system's configured monitor.
    /// Failures are swallowed: monitoring must never perturb the actor it
    /// is observing.
    async fn record_event(&self, event: RuntimeEvent);
}

/// A handle to an actor: local actors resolve through the owning
/// `ActorSystem`'s registry, remote actors resolve through the transport.
#[derive(Clone)]
pub struct ActorRef {
    pub(crate) actor_id: ActorId,
    pub(crate) system: Arc<dyn SystemInternal>,
    pub(crate) remote_addr: Option<SocketAddr>,
}

impl fmt::Debug for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorRef")
            .field("actor_id", &self.actor_id)
            .field("remote_addr", &self.remote_addr)
            .finish()
    }
}

impl ActorRef {
    pub fn actor_id(&self) -> &ActorId {
        &self.actor_id
    }

    pub fn is_remote(&self) -> bool {
        self.remote_addr.is_some()
    }

    /// Fire-and-forget delivery. Dropped by a send interceptor, or aimed
    /// at an actor that no longer exists locally, is not an error: the
    /// sender observes `Ok(())` either way.
    pub async fn tell(&self, kind: MessageKind) -> Result<(), SystemError> {
        self.tell_from(kind, None).await
    }

    pub(crate) async fn tell_from(
        &self,
        kind: MessageKind,
        sender: Option<ActorRef>,
    ) -> Result<(), SystemError> {
        let kind = match self.system.apply_send_chain(&self.actor_id, kind) {
            Some(kind) => kind,
            None => return Ok(()),
        };

        match self.remote_addr {
            Some(addr) => {
                self.system
                    .deliver_remote(addr, &self.actor_id, MessageId::new(), kind)
                    .await
            }
            None => {
                let mut envelope = Envelope::new(kind);
                if let Some(sender) = sender {
                    envelope = envelope.with_sender(sender);
                }
                match self.system.deliver_local(&self.actor_id, envelope).await {
                    Err(SystemError::ActorNotFound(_)) => Ok(()),
                    other => other,
                }
            }
        }
    }

    /// Send `kind` and await a single reply, correlated by message id.
    /// Times out after `timeout`.
    pub async fn ask(&self, kind: MessageKind, timeout: Duration) -> Result<MessageKind, SystemError> {
        let id = MessageId::new();
        let receiver = self.system.register_pending(id);

        match self.remote_addr {
            Some(addr) => {
                self.system.deliver_remote(addr, &self.actor_id, id, kind).await?;
            }
            None => {
                let envelope = Envelope { id, sender: None, kind, timestamp: chrono::Utc::now() };
                self.system.deliver_local(&self.actor_id, envelope).await?;
            }
        }

        match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(SystemError::AskCancelled(self.actor_id.clone())),
            Err(_) => Err(SystemError::AskTimeout(self.actor_id.clone())),
        }
    }
}
