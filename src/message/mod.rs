//! The message envelope and the closed [`MessageKind`] enum every actor in
//! this runtime handles.

pub mod envelope;
pub mod traits;

pub use envelope::Envelope;
pub use traits::{MessageKind, MessagePriority, WorkerUpdate};
