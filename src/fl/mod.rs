//! Orchestrated federated learning: one coordinator, a fixed set of
//! workers, an aggregator, and an optional evaluator, wired together by
//! the same [`crate::message::MessageKind`] every other actor in this
//! runtime speaks.
//!
//! - `coordinator.rs` — [`CoordinatorActor`], the round state machine
//! - `aggregator.rs` — [`AggregatorActor`] and the [`fedavg`] function
//! - `worker.rs` — [`WorkerActor`]
//! - `evaluator.rs` — [`EvaluatorActor`]
//! - `errors.rs` — [`ProtocolError`]

pub mod aggregator;
pub mod coordinator;
pub mod errors;
pub mod evaluator;
pub mod worker;

pub use aggregator::{fedavg, AggregatorActor};
pub use coordinator::CoordinatorActor;
pub use errors::ProtocolError;
pub use evaluator::EvaluatorActor;
pub use worker::WorkerActor;
