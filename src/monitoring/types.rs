//! Monitoring event types and configuration structures.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::traits::{EventSeverity, MonitoringEvent};
use crate::util::ActorId;

/// Configuration for monitoring behavior.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringConfig {
    /// Whether monitoring is enabled
    pub enabled: bool,

    /// Maximum number of events to keep in history
    pub max_history_size: usize,

    /// Minimum severity level to record (events below this are filtered)
    pub severity_filter: EventSeverity,

    /// Interval for snapshot generation (if using background snapshots)
    #[serde(with = "crate::util::duration_serde")]
    pub snapshot_interval: Duration,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_history_size: 1000,
            severity_filter: EventSeverity::Info,
            snapshot_interval: Duration::from_secs(60),
        }
    }
}

/// Snapshot of monitoring state at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringSnapshot<E: MonitoringEvent> {
    pub timestamp: DateTime<Utc>,
    pub total_events: u64,
    pub trace_count: u64,
    pub debug_count: u64,
    pub info_count: u64,
    pub warning_count: u64,
    pub error_count: u64,
    pub critical_count: u64,
    pub recent_events: Vec<E>,
}

/// The single event type recorded through the runtime's `Monitor<RuntimeEvent>`
/// capability. Every subsystem wraps its own event struct in a `RuntimeEvent`
/// variant, so the whole crate shares one monitor instance (one `NoopMonitor`
/// or `InMemoryMonitor` per `ActorSystem`) instead of one per event family.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "family")]
pub enum RuntimeEvent {
    Actor(ActorEvent),
    Mailbox(MailboxEvent),
    System(SystemEvent),
    Supervision(SupervisionEvent),
    Transport(TransportEvent),
    Gossip(GossipEvent),
    Protocol(ProtocolEvent),
}

impl MonitoringEvent for RuntimeEvent {
    const EVENT_TYPE: &'static str = "runtime";

    fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Actor(e) => e.timestamp,
            Self::Mailbox(e) => e.timestamp,
            Self::System(e) => e.timestamp,
            Self::Supervision(e) => e.timestamp,
            Self::Transport(e) => e.timestamp,
            Self::Gossip(e) => e.timestamp,
            Self::Protocol(e) => e.timestamp,
        }
    }

    fn severity(&self) -> EventSeverity {
        match self {
            Self::Actor(e) => e.severity(),
            Self::Mailbox(e) => e.severity(),
            Self::System(e) => e.severity(),
            Self::Supervision(e) => e.severity(),
            Self::Transport(e) => e.severity(),
            Self::Gossip(e) => e.severity(),
            Self::Protocol(e) => e.severity(),
        }
    }
}

impl From<ActorEvent> for RuntimeEvent {
    fn from(e: ActorEvent) -> Self {
        Self::Actor(e)
    }
}
impl From<MailboxEvent> for RuntimeEvent {
    fn from(e: MailboxEvent) -> Self {
        Self::Mailbox(e)
    }
}
impl From<SystemEvent> for RuntimeEvent {
    fn from(e: SystemEvent) -> Self {
        Self::System(e)
    }
}
impl From<SupervisionEvent> for RuntimeEvent {
    fn from(e: SupervisionEvent) -> Self {
        Self::Supervision(e)
    }
}
impl From<TransportEvent> for RuntimeEvent {
    fn from(e: TransportEvent) -> Self {
        Self::Transport(e)
    }
}
impl From<GossipEvent> for RuntimeEvent {
    fn from(e: GossipEvent) -> Self {
        Self::Gossip(e)
    }
}
impl From<ProtocolEvent> for RuntimeEvent {
    fn from(e: ProtocolEvent) -> Self {
        Self::Protocol(e)
    }
}

// ============================================================================
// Supervision Events
// ============================================================================

/// Events related to supervisor operations and child management.
#[derive(Debug, Clone, Serialize)]
pub struct SupervisionEvent {
    pub timestamp: DateTime<Utc>,
    pub supervisor_id: ActorId,
    pub child_id: Option<ActorId>,
    pub event_kind: SupervisionEventKind,
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for SupervisionEvent {
    const EVENT_TYPE: &'static str = "supervision";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            SupervisionEventKind::ChildMonitored => EventSeverity::Info,
            SupervisionEventKind::HealthAckReceived => EventSeverity::Trace,
            SupervisionEventKind::HealthTimeout { failed_checks } => {
                if *failed_checks >= 2 {
                    EventSeverity::Error
                } else {
                    EventSeverity::Warning
                }
            }
            SupervisionEventKind::ChildRestarted => EventSeverity::Warning,
            SupervisionEventKind::ChildFailed { .. } => EventSeverity::Error,
        }
    }
}

/// Specific types of supervision events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum SupervisionEventKind {
    /// `MonitorChild` registered a new child recipe.
    ChildMonitored,
    /// A `HealthAck` arrived within the health-check window.
    HealthAckReceived,
    /// A `HealthPing` went unanswered within the timeout.
    HealthTimeout { failed_checks: u32 },
    /// The child was torn down and reinstantiated under the same id.
    ChildRestarted,
    /// `ChildFailed` was received from the child's own error handler.
    ChildFailed { error: String },
}

// ============================================================================
// Actor Events
// ============================================================================

/// Events related to actor lifecycle and message processing.
#[derive(Debug, Clone, Serialize)]
pub struct ActorEvent {
    pub timestamp: DateTime<Utc>,
    pub actor_id: ActorId,
    pub event_kind: ActorEventKind,
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for ActorEvent {
    const EVENT_TYPE: &'static str = "actor";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            ActorEventKind::Spawned => EventSeverity::Debug,
            ActorEventKind::PreStartFailed { .. } => EventSeverity::Error,
            ActorEventKind::BehaviorFailed { .. } => EventSeverity::Error,
            ActorEventKind::Became { .. } => EventSeverity::Trace,
            ActorEventKind::Stopped => EventSeverity::Info,
        }
    }
}

/// Specific types of actor events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ActorEventKind {
    Spawned,
    /// `pre_start` returned an error; reported upward as `ChildFailed`.
    PreStartFailed { error: String },
    /// The active behavior returned an error while handling a message.
    BehaviorFailed { error: String },
    /// `become`/`unbecome` swapped the active behavior.
    Became { to_default: bool },
    Stopped,
}

// ============================================================================
// System Events
// ============================================================================

/// Events related to ActorSystem-level operations.
#[derive(Debug, Clone, Serialize)]
pub struct SystemEvent {
    pub timestamp: DateTime<Utc>,
    pub event_kind: SystemEventKind,
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for SystemEvent {
    const EVENT_TYPE: &'static str = "system";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            SystemEventKind::ServerStarted { .. } => EventSeverity::Info,
            SystemEventKind::Shutdown => EventSeverity::Info,
            SystemEventKind::ActorRegistered { .. } => EventSeverity::Debug,
            SystemEventKind::ActorDeregistered { .. } => EventSeverity::Debug,
            SystemEventKind::AskTimeout { .. } => EventSeverity::Warning,
        }
    }
}

/// Specific types of system events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum SystemEventKind {
    ServerStarted { port: u16 },
    Shutdown,
    ActorRegistered { actor_id: ActorId },
    ActorDeregistered { actor_id: ActorId },
    AskTimeout { actor_id: ActorId },
}

// ============================================================================
// Transport events
// ============================================================================

/// Events related to the remote transport (connection cache, framing).
#[derive(Debug, Clone, Serialize)]
pub struct TransportEvent {
    pub timestamp: DateTime<Utc>,
    pub event_kind: TransportEventKind,
}

impl MonitoringEvent for TransportEvent {
    const EVENT_TYPE: &'static str = "transport";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            TransportEventKind::Connected { .. } => EventSeverity::Info,
            TransportEventKind::ConnectionEvicted { .. } => EventSeverity::Warning,
            TransportEventKind::FrameError { .. } => EventSeverity::Error,
            TransportEventKind::InsecureTlsAccepted => EventSeverity::Warning,
        }
    }
}

/// Specific types of transport events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum TransportEventKind {
    Connected { host: String, port: u16 },
    ConnectionEvicted { host: String, port: u16, reason: String },
    FrameError { reason: String },
    /// TLS is enabled but no CA was configured: peer verification is skipped.
    InsecureTlsAccepted,
}

// ============================================================================
// Gossip / federated-learning protocol events
// ============================================================================

/// Events emitted by the autonomous gossip peer protocol.
#[derive(Debug, Clone, Serialize)]
pub struct GossipEvent {
    pub timestamp: DateTime<Utc>,
    pub peer_id: String,
    pub event_kind: GossipEventKind,
}

impl MonitoringEvent for GossipEvent {
    const EVENT_TYPE: &'static str = "gossip";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            GossipEventKind::RoundTrained { .. } => EventSeverity::Info,
            GossipEventKind::GossipSent { .. } => EventSeverity::Trace,
            GossipEventKind::GossipReceived { .. } => EventSeverity::Trace,
            GossipEventKind::GlobalModelApplied { .. } => EventSeverity::Debug,
            GossipEventKind::ConvergenceReached => EventSeverity::Info,
        }
    }
}

/// Specific types of gossip events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum GossipEventKind {
    RoundTrained { round: u64, loss: f32, accuracy: f32 },
    GossipSent { targets: usize },
    GossipReceived { from: String },
    GlobalModelApplied { delta_norm: f32 },
    ConvergenceReached,
}

// ============================================================================
// Orchestrated federated protocol events
// ============================================================================

/// Events emitted by the coordinator/aggregator/worker/evaluator protocol.
#[derive(Debug, Clone, Serialize)]
pub struct ProtocolEvent {
    pub timestamp: DateTime<Utc>,
    pub round: u64,
    pub event_kind: ProtocolEventKind,
}

impl MonitoringEvent for ProtocolEvent {
    const EVENT_TYPE: &'static str = "protocol";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            ProtocolEventKind::RoundStarted => EventSeverity::Info,
            ProtocolEventKind::BarrierCrossed { .. } => EventSeverity::Info,
            ProtocolEventKind::AggregationDone => EventSeverity::Info,
            ProtocolEventKind::StaleUpdateDropped { .. } => EventSeverity::Warning,
            ProtocolEventKind::EmptyAggregation => EventSeverity::Warning,
        }
    }
}

/// Specific types of orchestrated-protocol events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ProtocolEventKind {
    RoundStarted,
    BarrierCrossed { worker_count: usize },
    AggregationDone,
    StaleUpdateDropped { from_round: u64 },
    EmptyAggregation,
}

// ============================================================================
// Mailbox Events
// ============================================================================

/// Events related to mailbox enqueue/dequeue operations.
#[derive(Debug, Clone, Serialize)]
pub struct MailboxEvent {
    pub timestamp: DateTime<Utc>,
    pub actor_id: ActorId,
    pub event_kind: MailboxEventKind,
}

impl MonitoringEvent for MailboxEvent {
    const EVENT_TYPE: &'static str = "mailbox";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            MailboxEventKind::Enqueued { .. } => EventSeverity::Trace,
            MailboxEventKind::Dequeued { .. } => EventSeverity::Trace,
            MailboxEventKind::EnqueueBlocked => EventSeverity::Warning,
        }
    }
}

/// Specific types of mailbox events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum MailboxEventKind {
    Enqueued { queue_len: usize },
    Dequeued { queue_len: usize },
    /// Enqueue found the mailbox at capacity and had to await free space.
    EnqueueBlocked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitoring_config_default() {
        let config = MonitoringConfig::default();
        assert!(config.enabled);
        assert_eq!(config.max_history_size, 1000);
    }

    #[test]
    fn test_runtime_event_delegates_severity() {
        let event: RuntimeEvent = SystemEvent {
            timestamp: Utc::now(),
            event_kind: SystemEventKind::Shutdown,
            metadata: HashMap::new(),
        }
        .into();
        assert_eq!(event.severity(), EventSeverity::Info);
    }

    #[test]
    fn test_supervision_event_severity_escalates() {
        let event = SupervisionEvent {
            timestamp: Utc::now(),
            supervisor_id: ActorId::from("sup"),
            child_id: Some(ActorId::from("c")),
            event_kind: SupervisionEventKind::HealthTimeout { failed_checks: 2 },
            metadata: HashMap::new(),
        };
        assert_eq!(event.severity(), EventSeverity::Error);
    }

    #[test]
    fn test_gossip_event_convergence_severity() {
        let event = GossipEvent {
            timestamp: Utc::now(),
            peer_id: "peer-a".to_string(),
            event_kind: GossipEventKind::ConvergenceReached,
        };
        assert_eq!(event.severity(), EventSeverity::Info);
        assert_eq!(GossipEvent::EVENT_TYPE, "gossip");
    }
}
