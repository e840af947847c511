//! # swarmrt — an actor runtime for federated and gossip-based learning
//!
//! A single-consumer-mailbox actor runtime, purpose-built for two
//! training topologies that share one wire format, one supervisor, and
//! one CRDT layer:
//!
//! - **Orchestrated federated learning** ([`fl`]): a coordinator drives
//!   workers through rounds of local SGD, closes a count-based barrier,
//!   and hands each round to an aggregator (FedAvg/FedProx) and an
//!   optional held-out evaluator.
//! - **Autonomous gossip learning** ([`gossip`]): peers train locally and
//!   exchange CRDT-merged model state directly with a random fanout of
//!   neighbors, with no central coordinator, converging via an
//!   eventually-consistent last-writer-wins merge.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use swarmrt::actor::{Actor, ActorContext};
//! use swarmrt::message::MessageKind;
//! use swarmrt::system::{ActorSystem, RuntimeConfig};
//! use async_trait::async_trait;
//!
//! #[derive(Debug)]
//! struct NeverError;
//! impl std::fmt::Display for NeverError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "never")
//!     }
//! }
//! impl std::error::Error for NeverError {}
//!
//! struct Pong;
//!
//! #[async_trait]
//! impl Actor for Pong {
//!     type Error = NeverError;
//!
//!     async fn handle_message(
//!         &mut self,
//!         message: MessageKind,
//!         ctx: &mut ActorContext,
//!     ) -> Result<(), Self::Error> {
//!         if matches!(message, MessageKind::HealthPing) {
//!             ctx.reply(MessageKind::HealthAck).await;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let system = ActorSystem::new(RuntimeConfig::default());
//! let pong = system.actor_of("pong", "pong-1", Pong).await.expect("spawn");
//! let reply = pong.ask(MessageKind::HealthPing, Duration::from_secs(1)).await.expect("ask");
//! assert!(matches!(reply, MessageKind::HealthAck));
//! # }
//! ```
//!
//! # Module organization
//!
//! - [`actor`] — the `Actor` trait and its per-call context
//! - [`message`] — the closed `MessageKind` wire enum and envelope
//! - [`mailbox`] — one bounded FIFO mailbox per actor
//! - [`system`] — `ActorSystem`, `ActorRef`, and configuration
//! - [`supervisor`] — a message-driven supervisor actor
//! - [`monitoring`] — the unified `RuntimeEvent` observability surface
//! - [`remote`] — length-prefixed bincode transport between systems
//! - [`crdt`] — `LwwMap` and `PnCounter`, the gossip layer's merge types
//! - [`classifier`] — the pluggable local-training model contract
//! - [`store`] — durable-shaped persistence of round/gossip history
//! - [`fl`] — the orchestrated coordinator/aggregator/worker/evaluator actors
//! - [`gossip`] — the autonomous peer/observer actors
//! - [`util`] — `ActorId`, `MessageId`

pub mod actor;
pub mod classifier;
pub mod crdt;
pub mod fl;
pub mod gossip;
pub mod mailbox;
pub mod message;
pub mod monitoring;
pub mod remote;
pub mod store;
pub mod supervisor;
pub mod system;
pub mod util;

pub use actor::{Actor, ActorContext, Behavior, BehaviorError, ErrorAction};
pub use classifier::{Classifier, LinearSoftmax, Metrics};
pub use crdt::{CrdtError, LwwMap, PnCounter, Timestamp};
pub use fl::{fedavg, AggregatorActor, CoordinatorActor, EvaluatorActor, ProtocolError, WorkerActor};
pub use gossip::{GossipPeerActor, ObserverActor};
pub use mailbox::{channel, Mailbox, MailboxError, MailboxSender, DEFAULT_MAILBOX_CAPACITY};
pub use message::{Envelope, MessageKind, MessagePriority, WorkerUpdate};
pub use monitoring::{
    ActorEvent, ActorEventKind, EventSeverity, GossipEvent, GossipEventKind, InMemoryMonitor,
    MailboxEvent, MailboxEventKind, Monitor, MonitoringConfig, MonitoringError, MonitoringEvent,
    MonitoringSnapshot, NoopMonitor, ProtocolEvent, ProtocolEventKind, RuntimeEvent,
    SupervisionEvent, SupervisionEventKind, SystemEvent, SystemEventKind, TransportEvent,
    TransportEventKind,
};
pub use store::{GossipMetricsRecord, GossipSnapshotRecord, InMemoryRoundStore, RoundRecord, RoundStore};
pub use supervisor::{SupervisorActor, SupervisorError, SupervisorHandle};
pub use system::{
    ActorRef, ActorSystem, ConfigError, CoordinatorConfig, GossipConfig, RuntimeConfig,
    SupervisorConfig, SystemError, TlsConfig,
};
pub use util::{ActorId, MessageId};
