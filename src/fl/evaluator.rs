//! Held-out evaluation of each round's global model.
//!
//! The evaluator is a pure observer in the control loop: it never replies
//! with anything that feeds back into aggregation, only a metrics report.

use std::sync::Arc;

use async_trait::async_trait;

use super::errors::ProtocolError;
use crate::actor::{Actor, ActorContext, ErrorAction};
use crate::classifier::Classifier;
use crate::message::MessageKind;
use crate::store::RoundStore;
use crate::system::ActorRef;

pub struct EvaluatorActor {
    evaluator_id: String,
    advertise_host: String,
    advertise_port: u16,
    coordinator: ActorRef,
    classifier: Box<dyn Classifier>,
    store: Arc<dyn RoundStore>,
}

impl EvaluatorActor {
    pub fn new(
        evaluator_id: impl Into<String>,
        advertise_host: impl Into<String>,
        advertise_port: u16,
        coordinator: ActorRef,
        classifier: Box<dyn Classifier>,
        store: Arc<dyn RoundStore>,
    ) -> Self {
        Self {
            evaluator_id: evaluator_id.into(),
            advertise_host: advertise_host.into(),
            advertise_port,
            coordinator,
            classifier,
            store,
        }
    }
}

#[async_trait]
impl Actor for EvaluatorActor {
    type Error = ProtocolError;

    async fn pre_start(&mut self, ctx: &mut ActorContext) -> Result<(), Self::Error> {
        let _ = self
            .coordinator
            .tell_from(
                MessageKind::RegisterEvaluator {
                    evaluator_id: self.evaluator_id.clone(),
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
            MessageKind::GlobalModelBroadcast { round, weights, bias } => {
                self.classifier.set_weights(weights, bias);
                let metrics = self.classifier.evaluate();
                let eval_metrics_json = serde_json::json!({
                    "round": round,
                    "loss": metrics.loss,
                    "accuracy": metrics.accuracy,
                })
                .to_string();
                self.store.put_round(round, None, None, Some(eval_metrics_json));
                ctx.reply(MessageKind::EvaluationResult {
                    round,
                    loss: metrics.loss,
                    accuracy: metrics.accuracy,
                })
                .await;
            }
            _ => {}
        }
        Ok(())
    }

    async fn on_error(&mut self, _error: Self::Error, _ctx: &mut ActorContext) -> ErrorAction {
        ErrorAction::Resume
    }
}
