//! The actor system: registry, spawn, and post-order teardown.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::actor_ref::{ActorRef, SystemInternal};
use super::config::RuntimeConfig;
use super::errors::SystemError;
use crate::actor::{Actor, ActorContext, ErrorAction};
use crate::mailbox::{channel, MailboxSender};
use crate::message::{Envelope, MessageKind};
use crate::monitoring::{
    ActorEvent, ActorEventKind, Monitor, NoopMonitor, RuntimeEvent, SystemEvent, SystemEventKind,
};
use crate::util::{ActorId, MessageId};

/// A pure, synchronous send/receive interceptor: observes (and may
/// rewrite or drop) a message addressed to `target`. Must be fast,
/// deterministic, and non-blocking — it runs inline on the sending or
/// receiving actor's own task.
type Interceptor = Box<dyn Fn(&ActorId, MessageKind) -> Option<MessageKind> + Send + Sync>;

/// Everything the system keeps about one locally running actor.
struct ActorHandle {
    sender: MailboxSender,
    join_handle: JoinHandle<()>,
    #[allow(dead_code)] // reserved for supervisor lookups (child -> owning supervisor)
    parent: Option<ActorId>,
}

/// Shared state behind every `ActorSystem` clone.
pub(crate) struct Inner<Mon: Monitor<RuntimeEvent>> {
    config: RuntimeConfig,
    actors: DashMap<ActorId, ActorHandle>,
    children: DashMap<ActorId, Vec<ActorId>>,
    pending_requests: DashMap<MessageId, oneshot::Sender<MessageKind>>,
    send_interceptors: RwLock<Vec<Interceptor>>,
    receive_interceptors: RwLock<Vec<Interceptor>>,
    monitor: Mon,
}

/// Owns the actor registry, routes local and remote delivery, and tears
/// down supervision subtrees in post-order (children before parents).
///
/// Generic over the monitor so a caller can plug in an
/// [`crate::monitoring::InMemoryMonitor`] for tests/ops tooling; the
/// default [`NoopMonitor`] compiles monitoring away entirely.
pub struct ActorSystem<Mon: Monitor<RuntimeEvent> = NoopMonitor<RuntimeEvent>> {
    inner: Arc<Inner<Mon>>,
}

impl<Mon: Monitor<RuntimeEvent>> Clone for ActorSystem<Mon> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl ActorSystem<NoopMonitor<RuntimeEvent>> {
    /// Create a system with monitoring compiled away.
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_monitor(config, NoopMonitor::new())
    }
}

impl<Mon: Monitor<RuntimeEvent>> ActorSystem<Mon> {
    /// Create a system recording events through `monitor`.
    pub fn with_monitor(config: RuntimeConfig, monitor: Mon) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                actors: DashMap::new(),
                children: DashMap::new(),
                pending_requests: DashMap::new(),
                send_interceptors: RwLock::new(Vec::new()),
                receive_interceptors: RwLock::new(Vec::new()),
                monitor,
            }),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// Append an interceptor to the send chain, run against every message
    /// as it leaves `ActorRef::tell`/`tell_from`, before local delivery or
    /// an outbound remote send. Returning `None` drops the message before
    /// it is ever handed to a mailbox or the wire.
    pub fn add_send_interceptor<F>(&self, interceptor: F)
    where
        F: Fn(&ActorId, MessageKind) -> Option<MessageKind> + Send + Sync + 'static,
    {
        self.inner.send_interceptors.write().push(Box::new(interceptor));
    }

    /// Append an interceptor to the receive chain, run against every
    /// message dequeued from a mailbox before it reaches
    /// `Actor::handle_message` (or the actor's active `Behavior`).
    /// Returning `None` drops the message.
    pub fn add_receive_interceptor<F>(&self, interceptor: F)
    where
        F: Fn(&ActorId, MessageKind) -> Option<MessageKind> + Send + Sync + 'static,
    {
        self.inner.receive_interceptors.write().push(Box::new(interceptor));
    }

    pub fn actor_count(&self) -> usize {
        self.inner.actors.len()
    }

    pub fn contains(&self, id: &ActorId) -> bool {
        self.inner.actors.contains_key(id)
    }

    /// The type-erased handle actors and messages address this system
    /// through, without depending on `Mon`.
    pub(crate) fn internal(&self) -> Arc<dyn SystemInternal> {
        Arc::clone(&self.inner) as Arc<dyn SystemInternal>
    }

    fn make_ref(&self, id: &ActorId) -> ActorRef {
        ActorRef {
            actor_id: id.clone(),
            system: self.internal(),
            remote_addr: None,
        }
    }

    /// Build a handle to an actor living in a different system, reachable
    /// at `addr`. No connection is opened until the first send.
    pub fn remote_ref(&self, addr: SocketAddr, id: impl Into<ActorId>) -> ActorRef {
        ActorRef {
            actor_id: id.into(),
            system: self.internal(),
            remote_addr: Some(addr),
        }
    }

    /// Spawn a top-level actor (no supervising parent) under `id`.
    /// Spawning twice with the same id is idempotent: the existing
    /// actor's ref is returned and `actor` is dropped unused.
    pub async fn actor_of<A>(&self, class: &str, id: &str, actor: A) -> Result<ActorRef, SystemError>
    where
        A: Actor,
    {
        self.spawn_actor(class, id, None, actor).await
    }

    /// Spawn an actor as a supervised child of `parent`. Used by
    /// supervisors and by orchestrating code that wants post-order
    /// teardown to follow `parent` down to this actor.
    pub async fn actor_of_child<A>(
        &self,
        class: &str,
        id: &str,
        parent: &ActorId,
        actor: A,
    ) -> Result<ActorRef, SystemError>
    where
        A: Actor,
    {
        self.spawn_actor(class, id, Some(parent.clone()), actor).await
    }

    async fn spawn_actor<A>(
        &self,
        class: &str,
        id: &str,
        parent: Option<ActorId>,
        mut actor: A,
    ) -> Result<ActorRef, SystemError>
    where
        A: Actor,
    {
        let actor_id = ActorId::from(id);
        if self.inner.actors.contains_key(&actor_id) {
            return Ok(self.make_ref(&actor_id));
        }

        let (mut mailbox, sender) = channel(self.inner.config.mailbox_capacity);
        let self_ref = self.make_ref(&actor_id);
        let parent_ref = parent.as_ref().map(|p| self.make_ref(p));
        let mut ctx = ActorContext::new(self_ref.clone(), parent_ref);

        let inner = Arc::clone(&self.inner);
        let loop_actor_id = actor_id.clone();
        let class_name = class.to_string();

        let join_handle = tokio::task::spawn(async move {
            if let Err(error) = actor.pre_start(&mut ctx).await {
                let message = error.to_string();
                record(&inner, &loop_actor_id, ActorEventKind::PreStartFailed { error: message.clone() }).await;
                if let Some(parent_ref) = ctx.parent() {
                    let _ = parent_ref
                        .tell(MessageKind::ChildFailed {
                            child_id: loop_actor_id.clone(),
                            error: message,
                        })
                        .await;
                }
                inner.actors.remove(&loop_actor_id);
                return;
            }
            record(&inner, &loop_actor_id, ActorEventKind::Spawned).await;
            inner
                .record_event(RuntimeEvent::from(SystemEvent {
                    timestamp: Utc::now(),
                    event_kind: SystemEventKind::ActorRegistered {
                        actor_id: loop_actor_id.clone(),
                    },
                    metadata: HashMap::from([("class".to_string(), class_name)]),
                }))
                .await;

            loop {
                let envelope = match mailbox.recv().await {
                    Some(envelope) => envelope,
                    None => break,
                };
                if matches!(envelope.kind, MessageKind::Shutdown) {
                    break;
                }

                let kind = match inner.apply_receive_chain(&loop_actor_id, envelope.kind) {
                    Some(kind) => kind,
                    None => continue,
                };

                ctx.current_sender = envelope.sender;
                ctx.current_message_id = Some(envelope.id);

                // If a behavior is active (installed via `ctx.become_`),
                // dispatch through it instead of `handle_message`. It is
                // taken out of the context for the duration of the call
                // so the behavior can hold `&mut ctx` itself; it is put
                // back afterward unless the call changed the stack (the
                // behavior became/unbecame itself), in which case the
                // stack's new state wins.
                let failure = match ctx.pop_behavior() {
                    Some((name, mut behavior)) => {
                        let depth_before = ctx.behavior_depth();
                        let outcome = behavior.handle(kind, &mut ctx).await;
                        if ctx.behavior_depth() == depth_before {
                            ctx.push_behavior((name, behavior));
                        }
                        match outcome {
                            Ok(()) => None,
                            Err(error) => {
                                let message = error.to_string();
                                let action = actor.on_behavior_error(error, &mut ctx).await;
                                Some((message, action))
                            }
                        }
                    }
                    None => match actor.handle_message(kind, &mut ctx).await {
                        Ok(()) => None,
                        Err(error) => {
                            let message = error.to_string();
                            let action = actor.on_error(error, &mut ctx).await;
                            Some((message, action))
                        }
                    },
                };

                if let Some((message, action)) = failure {
                    record(&inner, &loop_actor_id, ActorEventKind::BehaviorFailed { error: message.clone() }).await;

                    match action {
                        ErrorAction::Resume => continue,
                        ErrorAction::Restart => {
                            if let Err(restart_error) = actor.pre_start(&mut ctx).await {
                                record(
                                    &inner,
                                    &loop_actor_id,
                                    ActorEventKind::PreStartFailed {
                                        error: restart_error.to_string(),
                                    },
                                )
                                .await;
                                break;
                            }
                            continue;
                        }
                        ErrorAction::Escalate => {
                            if let Some(parent_ref) = ctx.parent() {
                                let _ = parent_ref
                                    .tell(MessageKind::ChildFailed {
                                        child_id: loop_actor_id.clone(),
                                        error: message,
                                    })
                                    .await;
                            }
                            break;
                        }
                        ErrorAction::Stop => break,
                    }
                }
            }

            let _ = actor.post_stop(&mut ctx).await;
            record(&inner, &loop_actor_id, ActorEventKind::Stopped).await;
            inner.actors.remove(&loop_actor_id);
        });

        if let Some(parent_id) = &parent {
            self.inner
                .children
                .entry(parent_id.clone())
                .or_default()
                .push(actor_id.clone());
        }

        self.inner.actors.insert(
            actor_id,
            ActorHandle {
                sender,
                join_handle,
                parent,
            },
        );

        Ok(self_ref)
    }

    /// Tear down `root` and every descendant registered under it via
    /// `actor_of_child`, leaves first: each child's `Shutdown` is sent and
    /// its task awaited before its parent receives `Shutdown`.
    pub async fn stop_actor(&self, root: &ActorId) -> Result<(), SystemError> {
        self.inner.stop_local(root).await;
        Ok(())
    }

    /// Bind `addr` and route every inbound frame into this system's local
    /// registry via `deliver_local`, running for the life of the process.
    /// Returns the bound port, useful when `addr`'s port is 0.
    pub async fn listen(
        &self,
        addr: SocketAddr,
        tls: Option<crate::system::config::TlsConfig>,
    ) -> Result<u16, SystemError> {
        crate::remote::serve(addr, tls, self.internal())
            .await
            .map_err(SystemError::from)
    }
}

async fn record<Mon: Monitor<RuntimeEvent>>(inner: &Arc<Inner<Mon>>, actor_id: &ActorId, kind: ActorEventKind) {
    inner
        .record_event(RuntimeEvent::from(ActorEvent {
            timestamp: Utc::now(),
            actor_id: actor_id.clone(),
            event_kind: kind,
            metadata: HashMap::new(),
        }))
        .await;
}

#[async_trait]
impl<Mon: Monitor<RuntimeEvent>> SystemInternal for Inner<Mon> {
    async fn deliver_local(&self, target: &ActorId, envelope: Envelope) -> Result<(), SystemError> {
        let handle = self
            .actors
            .get(target)
            .ok_or_else(|| SystemError::ActorNotFound(target.clone()))?;
        handle
            .sender
            .send(envelope)
            .await
            .map_err(|source| SystemError::Mailbox {
                actor_id: target.clone(),
                source,
            })
    }

    async fn deliver_remote(
        &self,
        addr: SocketAddr,
        target: &ActorId,
        id: MessageId,
        kind: MessageKind,
    ) -> Result<(), SystemError> {
        crate::remote::send(addr, target, id, kind, self.config.tls.as_ref())
            .await
            .map_err(SystemError::from)
    }

    fn apply_send_chain(&self, target: &ActorId, msg: MessageKind) -> Option<MessageKind> {
        self.send_interceptors.read().iter().try_fold(msg, |acc, interceptor| interceptor(target, acc))
    }

    fn apply_receive_chain(&self, target: &ActorId, msg: MessageKind) -> Option<MessageKind> {
        self.receive_interceptors
            .read()
            .iter()
            .try_fold(msg, |acc, interceptor| interceptor(target, acc))
    }

    fn register_pending(&self, id: MessageId) -> oneshot::Receiver<MessageKind> {
        let (tx, rx) = oneshot::channel();
        self.pending_requests.insert(id, tx);
        rx
    }

    fn resolve_pending(&self, id: MessageId, reply: MessageKind) -> bool {
        match self.pending_requests.remove(&id) {
            Some((_, tx)) => tx.send(reply).is_ok(),
            None => false,
        }
    }

    async fn record_event(&self, event: RuntimeEvent) {
        let _ = self.monitor.record(event).await;
    }

    async fn stop_local(&self, root: &ActorId) {
        let mut order = vec![root.clone()];
        let mut queue = VecDeque::from([root.clone()]);
        while let Some(id) = queue.pop_front() {
            if let Some(children) = self.children.get(&id) {
                for child in children.value() {
                    order.push(child.clone());
                    queue.push_back(child.clone());
                }
            }
        }

        for id in order.into_iter().rev() {
            if let Some((_, handle)) = self.actors.remove(&id) {
                let _ = handle.sender.send(Envelope::new(MessageKind::Shutdown)).await;
                let _ = handle.join_handle.await;
            }
            self.children.remove(&id);
        }

        self.record_event(RuntimeEvent::from(SystemEvent {
            timestamp: Utc::now(),
            event_kind: SystemEventKind::ActorDeregistered { actor_id: root.clone() },
            metadata: HashMap::new(),
        }))
        .await;
    }
}
