//! The closed set of messages actors in this runtime can exchange.
//!
//! Unlike a generic `Message` trait parameterized per actor type, every
//! actor in this crate handles the same [`MessageKind`] enum. That keeps a
//! single wire format (see `crate::remote::codec`) and lets the
//! `ActorSystem` route, intercept, and serialize messages without type
//! erasure.

use serde::{Deserialize, Serialize};

use crate::crdt::{LwwMap, PnCounter};
use crate::util::ActorId;

/// Priority used by the mailbox to decide delivery order. Control messages
/// default to `High`; application messages default to `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MessagePriority {
    Low = 0,
    Normal = 1,
    High = 2,
    Critical = 3,
}

/// One worker's contribution to a round, carried inside
/// [`MessageKind::AggregateRound`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerUpdate {
    pub worker_id: String,
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
    pub num_samples: usize,
    pub loss: f32,
}

/// Every message that can cross an actor's mailbox boundary, in-process or
/// over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum MessageKind {
    // -- Control --------------------------------------------------------
    /// Tells an actor to stop after finishing any message it is already
    /// processing. `post_stop` runs before children are torn down.
    Shutdown,
    /// A supervisor's health probe.
    HealthPing,
    /// A child's reply to `HealthPing`.
    HealthAck,
    /// A child reports its own handler failed in a way it cannot recover
    /// from; sent to the actor's supervisor.
    ChildFailed { child_id: ActorId, error: String },
    /// Supervisor-internal: tear down and respawn `child_id` under the
    /// same id.
    RestartChild { child_id: ActorId },
    /// Register a new child recipe with a supervisor so it starts
    /// health-probing it.
    MonitorChild { child_id: ActorId },
    /// Self-scheduled: prompts a supervisor to health-probe every
    /// monitored child due for a check.
    SupervisorTick,
    /// Self-scheduled: fires `health_timeout` after a `HealthPing` was
    /// sent; a no-op if the child already acked.
    HealthCheckTimeout { child_id: ActorId },
    /// Self-scheduled: prompts a gossip peer to select fanout peers and
    /// exchange state.
    GossipTick,
    /// Self-scheduled: prompts a gossip peer to run one local training
    /// iteration (recompute global, train, publish, recompute global).
    GossipTrainTick,
    /// Self-scheduled: prompts the coordinator to health-probe the
    /// aggregator and evaluator refs, if any are registered.
    CoordinatorTick,
    /// Self-scheduled: fires `health_timeout` after the coordinator pinged
    /// `role` ("aggregator" or "evaluator"); a no-op if it already acked.
    CoordinatorHealthTimeout { role: String },

    // -- Orchestrated federated learning ---------------------------------
    RegisterWorker { worker_id: String, host: String, port: u16 },
    RegisterAggregator { aggregator_id: String, host: String, port: u16 },
    RegisterEvaluator { evaluator_id: String, host: String, port: u16 },
    /// Coordinator -> worker: train one round starting from this snapshot.
    TrainRequest {
        round: u64,
        weights: Vec<Vec<f32>>,
        bias: Vec<f32>,
        batch_size: usize,
        learning_rate: f32,
        /// `Some(mu)` selects FedProx with the given proximal term.
        prox_mu: Option<f32>,
    },
    /// Worker -> aggregator: the result of one local training round.
    ModelUpdate {
        round: u64,
        worker_id: String,
        weights: Vec<Vec<f32>>,
        bias: Vec<f32>,
        num_samples: usize,
        loss: f32,
    },
    /// Coordinator -> workers/evaluator: the new global model.
    GlobalModelBroadcast { round: u64, weights: Vec<Vec<f32>>, bias: Vec<f32> },
    /// Coordinator -> aggregator: the round's barrier has closed; aggregate
    /// the attached per-worker updates.
    AggregateRound { round: u64, updates: Vec<WorkerUpdate> },
    /// Aggregator -> coordinator: the FedAvg/FedProx result for the round.
    AggregatedResult { round: u64, weights: Vec<Vec<f32>>, bias: Vec<f32> },
    /// Evaluator -> coordinator: held-out metrics for the round's global
    /// model.
    EvaluationResult { round: u64, loss: f32, accuracy: f32 },

    // -- Autonomous gossip ------------------------------------------------
    /// Announces a new peer to an existing member of the gossip overlay.
    GossipPeerJoin { peer_id: String, host: String, port: u16 },
    /// A peer's periodic CRDT snapshot exchange.
    GossipState {
        peer_id: String,
        round: u64,
        weights: LwwMap<f32>,
        sample_counts: PnCounter,
        loss: f32,
        accuracy: f32,
    },
    /// Piggybacked membership view, exchanged alongside gossip state.
    MembershipUpdate { peers: Vec<(String, String, u16)> },
}

impl MessageKind {
    /// Stable type tag, used in monitoring events and log lines.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Shutdown => "shutdown",
            Self::HealthPing => "health_ping",
            Self::HealthAck => "health_ack",
            Self::ChildFailed { .. } => "child_failed",
            Self::RestartChild { .. } => "restart_child",
            Self::MonitorChild { .. } => "monitor_child",
            Self::SupervisorTick => "supervisor_tick",
            Self::HealthCheckTimeout { .. } => "health_check_timeout",
            Self::GossipTick => "gossip_tick",
            Self::GossipTrainTick => "gossip_train_tick",
            Self::CoordinatorTick => "coordinator_tick",
            Self::CoordinatorHealthTimeout { .. } => "coordinator_health_timeout",
            Self::RegisterWorker { .. } => "register_worker",
            Self::RegisterAggregator { .. } => "register_aggregator",
            Self::RegisterEvaluator { .. } => "register_evaluator",
            Self::TrainRequest { .. } => "train_request",
            Self::ModelUpdate { .. } => "model_update",
            Self::GlobalModelBroadcast { .. } => "global_model_broadcast",
            Self::AggregateRound { .. } => "aggregate_round",
            Self::AggregatedResult { .. } => "aggregated_result",
            Self::EvaluationResult { .. } => "evaluation_result",
            Self::GossipPeerJoin { .. } => "gossip_peer_join",
            Self::GossipState { .. } => "gossip_state",
            Self::MembershipUpdate { .. } => "membership_update",
        }
    }

    /// Default mailbox priority for this message kind.
    pub fn priority(&self) -> MessagePriority {
        match self {
            Self::Shutdown | Self::ChildFailed { .. } => MessagePriority::Critical,
            Self::HealthPing
            | Self::HealthAck
            | Self::RestartChild { .. }
            | Self::MonitorChild { .. }
            | Self::HealthCheckTimeout { .. }
            | Self::CoordinatorHealthTimeout { .. } => MessagePriority::High,
            Self::SupervisorTick | Self::GossipTick | Self::GossipTrainTick | Self::CoordinatorTick => {
                MessagePriority::Low
            }
            _ => MessagePriority::Normal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(MessagePriority::Low < MessagePriority::Normal);
        assert!(MessagePriority::Normal < MessagePriority::High);
        assert!(MessagePriority::High < MessagePriority::Critical);
    }

    #[test]
    fn test_shutdown_is_critical() {
        assert_eq!(MessageKind::Shutdown.priority(), MessagePriority::Critical);
    }

    #[test]
    fn test_kind_name_stable() {
        let msg = MessageKind::ChildFailed {
            child_id: ActorId::from("w1"),
            error: "boom".to_string(),
        };
        assert_eq!(msg.kind_name(), "child_failed");
    }
}
