//! # Monitoring Module
//!
//! Universal monitoring infrastructure for observing and tracking events across all runtime components.
//!
//! ## Features
//! - **Generic Monitor<E> Trait**: Universal monitoring for any entity type
//! - **Zero-Cost Abstraction**: NoopMonitor compiles away when disabled
//! - **Lock-Free Recording**: Atomic counters for concurrent event tracking
//! - **Type Safety**: MonitoringEvent trait ensures compile-time correctness
//!
//! ## Event type
//! Every subsystem wraps its own event struct in a single [`RuntimeEvent`]
//! enum, so one `Monitor<RuntimeEvent>` instance covers actor lifecycle,
//! mailbox, system, supervision, transport, gossip, and orchestrated-protocol
//! events.
//!
//! ## Examples
//! ```
//! use swarmrt::monitoring::{InMemoryMonitor, Monitor, MonitoringConfig, RuntimeEvent};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MonitoringConfig::default();
//! let monitor: InMemoryMonitor<RuntimeEvent> = InMemoryMonitor::new(config);
//! let snapshot = monitor.snapshot().await?;
//! assert_eq!(snapshot.total_events, 0);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod in_memory;
pub mod noop;
pub mod traits;
pub mod types;

pub use error::MonitoringError;
pub use in_memory::InMemoryMonitor;
pub use noop::NoopMonitor;
pub use traits::{EventSeverity, Monitor, MonitoringEvent};
pub use types::{
    ActorEvent, ActorEventKind, GossipEvent, GossipEventKind, MailboxEvent, MailboxEventKind,
    MonitoringConfig, MonitoringSnapshot, ProtocolEvent, ProtocolEventKind, RuntimeEvent,
    SupervisionEvent, SupervisionEventKind, SystemEvent, SystemEventKind, TransportEvent,
    TransportEventKind,
};
