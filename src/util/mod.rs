//! Utility types and helpers shared across the runtime.

pub mod ids;
pub mod serde_helpers;

pub use ids::{ActorId, MessageId};
pub use serde_helpers::duration_serde;
