//! Per-call context handed to every [`super::traits::Actor`] hook.

use std::collections::HashMap;

use chrono::Utc;

use super::traits::Behavior;
use crate::message::MessageKind;
use crate::monitoring::{ActorEvent, ActorEventKind, RuntimeEvent};
use crate::system::ActorRef;
use crate::util::MessageId;

/// State and messaging handle passed to `Actor::handle_message`,
/// `pre_start`, `post_stop`, and `on_error`.
///
/// `become_`/`unbecome` push and pop entries on a stack of boxed
/// [`Behavior`]s. Whichever one is on top is what the mailbox loop
/// dispatches the next message to, in place of `Actor::handle_message`;
/// popping the last one hands dispatch back to the actor itself.
pub struct ActorContext {
    self_ref: ActorRef,
    parent: Option<ActorRef>,
    pub(crate) current_sender: Option<ActorRef>,
    pub(crate) current_message_id: Option<MessageId>,
    behavior_stack: Vec<(&'static str, Box<dyn Behavior>)>,
}

impl ActorContext {
    pub(crate) fn new(self_ref: ActorRef, parent: Option<ActorRef>) -> Self {
        Self {
            self_ref,
            parent,
            current_sender: None,
            current_message_id: None,
            behavior_stack: Vec::new(),
        }
    }

    /// This actor's own address.
    pub fn actor_ref(&self) -> &ActorRef {
        &self.self_ref
    }

    /// The actor that spawned this one, if any.
    pub fn parent(&self) -> Option<&ActorRef> {
        self.parent.as_ref()
    }

    /// The sender of the message currently being handled, if one was
    /// attached.
    pub fn sender(&self) -> Option<&ActorRef> {
        self.current_sender.as_ref()
    }

    /// Reply to whoever sent the message currently being handled.
    ///
    /// If the in-flight message arrived via `ActorRef::ask`, this
    /// resolves the asker's pending future directly. Otherwise it falls
    /// back to a fire-and-forget `tell` on `current_sender`; if there is
    /// no sender at all, the reply is silently dropped.
    pub async fn reply(&self, kind: MessageKind) {
        if let Some(id) = self.current_message_id {
            if self.self_ref.system.resolve_pending(id, kind.clone()) {
                return;
            }
        }
        if let Some(sender) = &self.current_sender {
            let _ = sender.tell_from(kind, Some(self.self_ref.clone())).await;
        }
    }

    /// Install `behavior` as the handler for every message from this one
    /// on, until `unbecome` (or the behavior unbecoming itself) pops it.
    pub async fn become_<B>(&mut self, name: &'static str, behavior: B)
    where
        B: Behavior + 'static,
    {
        self.behavior_stack.push((name, Box::new(behavior)));
        self.record(ActorEventKind::Became { to_default: false }).await;
    }

    /// Pop the most recently installed behavior, if any, reverting
    /// dispatch to whichever behavior (or `handle_message`) was active
    /// before it.
    pub async fn unbecome(&mut self) {
        self.behavior_stack.pop();
        let to_default = self.behavior_stack.is_empty();
        self.record(ActorEventKind::Became { to_default }).await;
    }

    /// The name given to the currently active behavior, if `become_` has
    /// been called more times than `unbecome`.
    pub fn current_behavior(&self) -> Option<&'static str> {
        self.behavior_stack.last().map(|(name, _)| *name)
    }

    /// Remove and return the active behavior so the mailbox loop can
    /// dispatch through it without holding two mutable borrows of `self`
    /// at once. Pairs with `push_behavior`.
    pub(crate) fn pop_behavior(&mut self) -> Option<(&'static str, Box<dyn Behavior>)> {
        self.behavior_stack.pop()
    }

    /// Restore a behavior taken out by `pop_behavior`.
    pub(crate) fn push_behavior(&mut self, entry: (&'static str, Box<dyn Behavior>)) {
        self.behavior_stack.push(entry);
    }

    /// Number of behaviors currently on the stack, used by the mailbox
    /// loop to detect whether a behavior called `become_`/`unbecome` on
    /// itself while handling a message.
    pub(crate) fn behavior_depth(&self) -> usize {
        self.behavior_stack.len()
    }

    pub(crate) async fn record(&self, kind: ActorEventKind) {
        let event = ActorEvent {
            timestamp: Utc::now(),
            actor_id: self.self_ref.actor_id().clone(),
            event_kind: kind,
            metadata: HashMap::new(),
        };
        self.self_ref
            .system
            .record_event(RuntimeEvent::from(event))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::actor::traits::BehaviorError;
    use crate::system::ActorSystem;
    use crate::util::ActorId;

    struct EchoBehavior {
        replies: Vec<String>,
    }

    #[async_trait]
    impl Behavior for EchoBehavior {
        async fn handle(&mut self, message: MessageKind, _ctx: &mut ActorContext) -> Result<(), BehaviorError> {
            if let MessageKind::CoordinatorHealthTimeout { role } = message {
                self.replies.push(role);
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_become_and_unbecome_track_a_stack() {
        let system = ActorSystem::new(Default::default());
        let actor_ref = ActorRef {
            actor_id: ActorId::from("probe"),
            system: system.internal(),
            remote_addr: None,
        };
        let mut ctx = ActorContext::new(actor_ref, None);
        assert_eq!(ctx.current_behavior(), None);

        ctx.become_("authenticating", EchoBehavior { replies: Vec::new() }).await;
        assert_eq!(ctx.current_behavior(), Some("authenticating"));

        ctx.unbecome().await;
        assert_eq!(ctx.current_behavior(), None);
    }

    #[tokio::test]
    #[allow(clippy::expect_used)]
    async fn test_pop_and_push_behavior_round_trips() {
        let system = ActorSystem::new(Default::default());
        let actor_ref = ActorRef {
            actor_id: ActorId::from("probe"),
            system: system.internal(),
            remote_addr: None,
        };
        let mut ctx = ActorContext::new(actor_ref, None);
        ctx.become_("alternate", EchoBehavior { replies: Vec::new() }).await;

        assert_eq!(ctx.behavior_depth(), 1);
        let entry = ctx.pop_behavior().expect("behavior present");
        assert_eq!(ctx.behavior_depth(), 0);
        assert_eq!(ctx.current_behavior(), None);

        ctx.push_behavior(entry);
        assert_eq!(ctx.current_behavior(), Some("alternate"));
    }
}
