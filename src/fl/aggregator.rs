//! Sample-weighted averaging of per-round worker updates (FedAvg).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::errors::ProtocolError;
use crate::actor::{Actor, ActorContext, ErrorAction};
use crate::message::{MessageKind, WorkerUpdate};
use crate::monitoring::{ProtocolEvent, ProtocolEventKind, RuntimeEvent};
use crate::store::RoundStore;
use crate::system::ActorRef;

/// `W̄ = Σ (n_i/Σn)·W_i`, `b̄` analogously. Errors on an empty or
/// zero-sample input rather than dividing by zero.
pub fn fedavg(round: u64, updates: &[WorkerUpdate]) -> Result<(Vec<Vec<f32>>, Vec<f32>), ProtocolError> {
    let total_n: usize = updates.iter().map(|u| u.num_samples).sum();
    if updates.is_empty() || total_n == 0 {
        return Err(ProtocolError::EmptyAggregation { round });
    }

    let num_classes = updates[0].weights.len();
    let num_features = updates[0].weights[0].len();
    let mut weights = vec![vec![0.0f32; num_features]; num_classes];
    let mut bias = vec![0.0f32; num_classes];

    for update in updates {
        let share = update.num_samples as f32 / total_n as f32;
        for class in 0..num_classes {
            for feature in 0..num_features {
                weights[class][feature] += share * update.weights[class][feature];
            }
            bias[class] += share * update.bias[class];
        }
    }

    Ok((weights, bias))
}

/// Receives a round's worker updates from the coordinator, computes
/// FedAvg, persists the round, and replies with the result.
pub struct AggregatorActor {
    aggregator_id: String,
    advertise_host: String,
    advertise_port: u16,
    coordinator: ActorRef,
    store: Arc<dyn RoundStore>,
}

impl AggregatorActor {
    pub fn new(
        aggregator_id: impl Into<String>,
        advertise_host: impl Into<String>,
        advertise_port: u16,
        coordinator: ActorRef,
        store: Arc<dyn RoundStore>,
    ) -> Self {
        Self {
            aggregator_id: aggregator_id.into(),
            advertise_host: advertise_host.into(),
            advertise_port,
            coordinator,
            store,
        }
    }

    async fn emit(&self, ctx: &ActorContext, round: u64, kind: ProtocolEventKind) {
        ctx.actor_ref()
            .system
            .record_event(RuntimeEvent::from(ProtocolEvent {
                timestamp: Utc::now(),
                round,
                event_kind: kind,
            }))
            .await;
    }
}

#[async_trait]
impl Actor for AggregatorActor {
    type Error = ProtocolError;

    async fn pre_start(&mut self, ctx: &mut ActorContext) -> Result<(), Self::Error> {
        let _ = self
            .coordinator
            .tell_from(
                MessageKind::RegisterAggregator {
                    aggregator_id: self.aggregator_id.clone(),
                    host: self.advertise_host.clone(),
                    port: self.advertise_port,
                },
                Some(ctx.actor_ref().clone()),
            )
            .await;
        Ok(())
    }

    async fn handle_message(
        &mut self,
        message: MessageKind,
        ctx: &mut ActorContext,
    ) -> Result<(), Self::Error> {
        match message {
            MessageKind::HealthPing => {
                ctx.reply(MessageKind::HealthAck).await;
            }
            MessageKind::AggregateRound { round, updates } => {
                let reply_to = ctx.sender().cloned().unwrap_or_else(|| self.coordinator.clone());
                match fedavg(round, &updates) {
                    Ok((weights, bias)) => {
                        let train_metrics_json = serde_json::json!({
                            "round": round,
                            "worker_count": updates.len(),
                            "total_samples": updates.iter().map(|u| u.num_samples).sum::<usize>(),
                        })
                        .to_string();
                        let weights_blob = bincode::serialize(&(&weights, &bias)).unwrap_or_default();
                        self.store.put_round(round, Some(weights_blob), Some(train_metrics_json), None);
                        self.emit(ctx, round, ProtocolEventKind::AggregationDone).await;
                        let _ = reply_to
                            .tell(MessageKind::AggregatedResult { round, weights, bias })
                            .await;
                    }
                    Err(_) => {
                        self.emit(ctx, round, ProtocolEventKind::EmptyAggregation).await;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn on_error(&mut self, _error: Self::Error, _ctx: &mut ActorContext) -> ErrorAction {
        ErrorAction::Resume
    }
}
