//! Actor system: registry, spawn, post-order teardown, and actor refs.

pub mod actor_ref;
pub mod actor_system;
pub mod config;
pub mod errors;

pub use actor_ref::ActorRef;
pub use actor_system::ActorSystem;
pub use config::{CoordinatorConfig, GossipConfig, RuntimeConfig, SupervisorConfig, TlsConfig};
pub use errors::{ConfigError, SystemError};
