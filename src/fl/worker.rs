//! Local SGD training on receipt of a round's global model.

use async_trait::async_trait;

use super::errors::ProtocolError;
use crate::actor::{Actor, ActorContext, ErrorAction};
use crate::classifier::Classifier;
use crate::message::MessageKind;
use crate::system::ActorRef;

/// Trains `classifier` locally for a round on request, optionally with a
/// FedProx proximal term pulling it back toward the received global
/// snapshot.
pub struct WorkerActor {
    worker_id: String,
    advertise_host: String,
    advertise_port: u16,
    local_epochs: usize,
    coordinator: ActorRef,
    classifier: Box<dyn Classifier>,
}

impl WorkerActor {
    pub fn new(
        worker_id: impl Into<String>,
        advertise_host: impl Into<String>,
        advertise_port: u16,
        local_epochs: usize,
        coordinator: ActorRef,
        classifier: Box<dyn Classifier>,
    ) -> Self {
        Self {
            worker_id: worker_id.into(),
            advertise_host: advertise_host.into(),
            advertise_port,
            local_epochs,
            coordinator,
            classifier,
        }
    }
}

#[async_trait]
impl Actor for WorkerActor {
    type Error = ProtocolError;

    async fn pre_start(&mut self, ctx: &mut ActorContext) -> Result<(), Self::Error> {
        let _ = self
            .coordinator
            .tell_from(
                MessageKind::RegisterWorker {
                    worker_id: self.worker_id.clone(),
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
            MessageKind::TrainRequest {
                round,
                weights,
                bias,
                batch_size,
                learning_rate,
                prox_mu,
            } => {
                self.classifier.set_weights(weights.clone(), bias.clone());
                let mut metrics = crate::classifier::Metrics::default();
                for _ in 0..self.local_epochs.max(1) {
                    let prox = prox_mu.map(|mu| (mu, weights.clone(), bias.clone()));
                    metrics = self.classifier.train_epoch(batch_size, learning_rate, prox);
                }
                let (trained_weights, trained_bias) = self.classifier.weights();
                ctx.reply(MessageKind::ModelUpdate {
                    round,
                    worker_id: self.worker_id.clone(),
                    weights: trained_weights,
                    bias: trained_bias,
                    num_samples: self.classifier.num_samples(),
                    loss: metrics.loss,
                })
                .await;
            }
            MessageKind::GlobalModelBroadcast { weights, bias, .. } => {
                self.classifier.set_weights(weights, bias);
            }
            _ => {}
        }
        Ok(())
    }

    async fn on_error(&mut self, _error: Self::Error, _ctx: &mut ActorContext) -> ErrorAction {
        ErrorAction::Resume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LinearSoftmax;
    use crate::system::{ActorSystem, RuntimeConfig};

    struct Sink;

    #[async_trait]
    impl Actor for Sink {
        type Error = ProtocolError;

        async fn handle_message(
            &mut self,
            _message: MessageKind,
            _ctx: &mut ActorContext,
        ) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_train_request_replies_with_model_update() {
        let system = ActorSystem::new(RuntimeConfig::default());
        let coordinator = system.actor_of("sink", "coord", Sink).await.expect("spawn sink");

        let worker = system
            .actor_of(
                "worker",
                "w1",
                WorkerActor::new(
                    "w1",
                    "127.0.0.1",
                    0,
                    1,
                    coordinator,
                    Box::new(LinearSoftmax::new(1, 2, 2, 20)),
                ),
            )
            .await
            .expect("spawn worker");

        let reply = worker
            .ask(
                MessageKind::TrainRequest {
                    round: 1,
                    weights: vec![vec![0.0, 0.0], vec![0.0, 0.0]],
                    bias: vec![0.0, 0.0],
                    batch_size: 4,
                    learning_rate: 0.1,
                    prox_mu: None,
                },
                std::time::Duration::from_millis(500),
            )
            .await
            .expect("ask");
        assert!(matches!(reply, MessageKind::ModelUpdate { round: 1, .. }));
    }
}
