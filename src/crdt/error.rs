//! Error types for CRDT operations.

use thiserror::Error;

/// Errors that can occur while merging or applying CRDT state.
#[derive(Debug, Error)]
pub enum CrdtError {
    #[error("replica id cannot be empty")]
    EmptyReplicaId,

    #[error("counter merge overflow for key {key}")]
    CounterOverflow { key: String },
}
