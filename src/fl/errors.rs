//! Errors from the orchestrated coordinator/aggregator/worker/evaluator
//! protocol.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    /// `AggregateRound` carried zero updates or their sample counts summed
    /// to zero; reported as a warning, the round stalls awaiting late
    /// registration or updates rather than aborting the process.
    #[error("round {round} has no updates to aggregate")]
    EmptyAggregation { round: u64 },
}
