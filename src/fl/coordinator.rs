//! Orchestrates one coordinator/aggregator/worker/evaluator run: tracks
//! round membership, the count-based update barrier, and health-probes
//! the aggregator and evaluator refs once registered.
//!
//! `INIT -> COLLECTING_PEERS -> RUNNING(k) -> AWAIT_AGG -> AWAIT_EVAL ->
//! RUNNING(k+1) -> ... -> DONE`. The state only ever advances on a
//! message; nothing here blocks a thread waiting for a round to close.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::errors::ProtocolError;
use crate::actor::{Actor, ActorContext, ErrorAction};
use crate::message::{MessageKind, WorkerUpdate};
use crate::monitoring::{ProtocolEvent, ProtocolEventKind, RuntimeEvent};
use crate::store::RoundStore;
use crate::system::{ActorRef, CoordinatorConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoordinatorState {
    Init,
    CollectingPeers,
    Running(u64),
    AwaitAgg(u64),
    AwaitEval(u64),
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeRole {
    Aggregator,
    Evaluator,
}

impl ProbeRole {
    fn as_str(self) -> &'static str {
        match self {
            Self::Aggregator => "aggregator",
            Self::Evaluator => "evaluator",
        }
    }
}

/// Owns the round state machine. Workers, the aggregator, and the
/// evaluator are all plain children registering themselves by message;
/// none of them hold a reference back to this actor beyond the one they
/// were constructed with.
pub struct CoordinatorActor {
    config: CoordinatorConfig,
    store: Arc<dyn RoundStore>,
    prox_mu: Option<f32>,
    batch_size: usize,
    learning_rate: f32,
    health_timeout: std::time::Duration,

    state: CoordinatorState,
    started: bool,
    workers: HashMap<String, ActorRef>,
    aggregator: Option<ActorRef>,
    evaluator: Option<ActorRef>,
    aggregator_awaiting_ack: bool,
    evaluator_awaiting_ack: bool,
    current_round: u64,
    global_weights: Vec<Vec<f32>>,
    global_bias: Vec<f32>,
    round_updates: HashMap<String, WorkerUpdate>,
    pending_aggregate: Option<(u64, Vec<WorkerUpdate>)>,
    pending_eval_broadcast: Option<(u64, Vec<Vec<f32>>, Vec<f32>)>,
    ticker: Option<tokio::task::JoinHandle<()>>,
}

impl CoordinatorActor {
    pub fn new(
        config: CoordinatorConfig,
        store: Arc<dyn RoundStore>,
        num_classes: usize,
        num_features: usize,
        batch_size: usize,
        learning_rate: f32,
        prox_mu: Option<f32>,
        health_timeout: std::time::Duration,
    ) -> Self {
        Self {
            config,
            store,
            prox_mu,
            batch_size,
            learning_rate,
            health_timeout,
            state: CoordinatorState::Init,
            started: false,
            workers: HashMap::new(),
            aggregator: None,
            evaluator: None,
            aggregator_awaiting_ack: false,
            evaluator_awaiting_ack: false,
            current_round: 0,
            global_weights: vec![vec![0.0; num_features]; num_classes],
            global_bias: vec![0.0; num_classes],
            round_updates: HashMap::new(),
            pending_aggregate: None,
            pending_eval_broadcast: None,
            ticker: None,
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

    /// Prefer the attached sender (same-system delivery via `tell_from`);
    /// only fall back to a host/port remote ref for true cross-system
    /// registration, where inbound frames carry no sender.
    fn resolve_ref(ctx: &ActorContext, host: &str, port: u16) -> Option<ActorRef> {
        if let Some(sender) = ctx.sender() {
            return Some(sender.clone());
        }
        let addr: SocketAddr = format!("{host}:{port}").parse().ok()?;
        Some(ActorRef {
            actor_id: crate::util::ActorId::from(format!("{host}:{port}")),
            system: Arc::clone(&ctx.actor_ref().system),
            remote_addr: Some(addr),
        })
    }

    async fn maybe_start_first_round(&mut self, ctx: &mut ActorContext) {
        if self.started || !self.config.auto_start {
            return;
        }
        if self.workers.len() < self.config.worker_count {
            self.state = CoordinatorState::CollectingPeers;
            return;
        }
        self.started = true;
        self.start_round(1, ctx).await;
    }

    async fn start_round(&mut self, round: u64, ctx: &mut ActorContext) {
        if round > self.config.max_rounds {
            self.state = CoordinatorState::Done;
            return;
        }
        self.current_round = round;
        self.state = CoordinatorState::Running(round);
        self.round_updates.clear();
        self.emit(ctx, round, ProtocolEventKind::RoundStarted).await;

        let request = MessageKind::TrainRequest {
            round,
            weights: self.global_weights.clone(),
            bias: self.global_bias.clone(),
            batch_size: self.batch_size,
            learning_rate: self.learning_rate,
            prox_mu: self.prox_mu,
        };
        for worker in self.workers.values() {
            let _ = worker.tell_from(request.clone(), Some(ctx.actor_ref().clone())).await;
        }
    }

    async fn handle_model_update(
        &mut self,
        ctx: &mut ActorContext,
        round: u64,
        worker_id: String,
        weights: Vec<Vec<f32>>,
        bias: Vec<f32>,
        num_samples: usize,
        loss: f32,
    ) {
        if !self.workers.contains_key(&worker_id) {
            return;
        }
        if round != self.current_round || !matches!(self.state, CoordinatorState::Running(_)) {
            self.emit(ctx, round, ProtocolEventKind::StaleUpdateDropped { from_round: round }).await;
            return;
        }

        self.round_updates.insert(
            worker_id.clone(),
            WorkerUpdate { worker_id, weights, bias, num_samples, loss },
        );

        if self.round_updates.len() < self.config.worker_count {
            return;
        }

        self.state = CoordinatorState::AwaitAgg(round);
        self.emit(ctx, round, ProtocolEventKind::BarrierCrossed { worker_count: self.config.worker_count })
            .await;

        let updates: Vec<WorkerUpdate> = self.round_updates.drain().map(|(_, v)| v).collect();
        match &self.aggregator {
            Some(aggregator) => {
                let _ = aggregator
                    .tell_from(MessageKind::AggregateRound { round, updates }, Some(ctx.actor_ref().clone()))
                    .await;
            }
            None => self.pending_aggregate = Some((round, updates)),
        }
    }

    async fn handle_aggregated_result(
        &mut self,
        ctx: &mut ActorContext,
        round: u64,
        weights: Vec<Vec<f32>>,
        bias: Vec<f32>,
    ) {
        if self.state != CoordinatorState::AwaitAgg(round) {
            return;
        }
        self.global_weights = weights.clone();
        self.global_bias = bias.clone();
        self.state = CoordinatorState::AwaitEval(round);

        let broadcast = MessageKind::GlobalModelBroadcast { round, weights, bias };
        for worker in self.workers.values() {
            let _ = worker.tell_from(broadcast.clone(), Some(ctx.actor_ref().clone())).await;
        }

        match &self.evaluator {
            Some(evaluator) => {
                let _ = evaluator.tell_from(broadcast, Some(ctx.actor_ref().clone())).await;
            }
            None => {
                let (round, weights, bias) = match broadcast {
                    MessageKind::GlobalModelBroadcast { round, weights, bias } => (round, weights, bias),
                    _ => unreachable!(),
                };
                self.pending_eval_broadcast = Some((round, weights, bias));
                self.start_round(round + 1, ctx).await;
            }
        }
    }

    async fn handle_evaluation_result(&mut self, ctx: &mut ActorContext, round: u64) {
        if self.state != CoordinatorState::AwaitEval(round) {
            return;
        }
        self.start_round(round + 1, ctx).await;
    }

    async fn probe(&mut self, ctx: &mut ActorContext, role: ProbeRole) {
        let target = match role {
            ProbeRole::Aggregator => &self.aggregator,
            ProbeRole::Evaluator => &self.evaluator,
        };
        let Some(target) = target.clone() else { return };

        match role {
            ProbeRole::Aggregator => self.aggregator_awaiting_ack = true,
            ProbeRole::Evaluator => self.evaluator_awaiting_ack = true,
        }
        let _ = target.tell_from(MessageKind::HealthPing, Some(ctx.actor_ref().clone())).await;

        let self_ref = ctx.actor_ref().clone();
        let timeout = self.health_timeout;
        let role_str = role.as_str().to_string();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = self_ref.tell(MessageKind::CoordinatorHealthTimeout { role: role_str }).await;
        });
    }
}

#[async_trait]
impl Actor for CoordinatorActor {
    type Error = ProtocolError;

    async fn pre_start(&mut self, ctx: &mut ActorContext) -> Result<(), Self::Error> {
        self.state = CoordinatorState::CollectingPeers;
        let self_ref = ctx.actor_ref().clone();
        let interval = self.health_timeout.max(std::time::Duration::from_millis(1)) * 2;
        self.ticker = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if self_ref.tell(MessageKind::CoordinatorTick).await.is_err() {
                    break;
                }
            }
        }));
        Ok(())
    }

    async fn post_stop(&mut self, _ctx: &mut ActorContext) -> Result<(), Self::Error> {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        Ok(())
    }

    async fn handle_message(
        &mut self,
        message: MessageKind,
        ctx: &mut ActorContext,
    ) -> Result<(), Self::Error> {
        match message {
            MessageKind::RegisterWorker { worker_id, host, port } => {
                if let Some(actor_ref) = Self::resolve_ref(ctx, &host, port) {
                    self.workers.insert(worker_id, actor_ref);
                }
                self.maybe_start_first_round(ctx).await;
            }
            MessageKind::RegisterAggregator { host, port, .. } => {
                if let Some(actor_ref) = Self::resolve_ref(ctx, &host, port) {
                    self.aggregator = Some(actor_ref.clone());
                    self.aggregator_awaiting_ack = false;
                    if let Some((round, updates)) = self.pending_aggregate.take() {
                        let _ = actor_ref
                            .tell_from(MessageKind::AggregateRound { round, updates }, Some(ctx.actor_ref().clone()))
                            .await;
                    }
                }
            }
            MessageKind::RegisterEvaluator { host, port, .. } => {
                if let Some(actor_ref) = Self::resolve_ref(ctx, &host, port) {
                    self.evaluator = Some(actor_ref.clone());
                    self.evaluator_awaiting_ack = false;
                    if let Some((round, weights, bias)) = self.pending_eval_broadcast.take() {
                        let _ = actor_ref
                            .tell_from(
                                MessageKind::GlobalModelBroadcast { round, weights, bias },
                                Some(ctx.actor_ref().clone()),
                            )
                            .await;
                    }
                }
            }
            MessageKind::ModelUpdate { round, worker_id, weights, bias, num_samples, loss } => {
                self.handle_model_update(ctx, round, worker_id, weights, bias, num_samples, loss).await;
            }
            MessageKind::AggregatedResult { round, weights, bias } => {
                self.handle_aggregated_result(ctx, round, weights, bias).await;
            }
            MessageKind::EvaluationResult { round, .. } => {
                self.handle_evaluation_result(ctx, round).await;
            }
            MessageKind::HealthAck => {
                if let Some(sender) = ctx.sender() {
                    if self.aggregator.as_ref().map(|a| a.actor_id()) == Some(sender.actor_id()) {
                        self.aggregator_awaiting_ack = false;
                    } else if self.evaluator.as_ref().map(|e| e.actor_id()) == Some(sender.actor_id()) {
                        self.evaluator_awaiting_ack = false;
                    }
                }
            }
            MessageKind::CoordinatorTick => {
                if !self.aggregator_awaiting_ack {
                    self.probe(ctx, ProbeRole::Aggregator).await;
                }
                if !self.evaluator_awaiting_ack {
                    self.probe(ctx, ProbeRole::Evaluator).await;
                }
            }
            MessageKind::CoordinatorHealthTimeout { role } => {
                if role == ProbeRole::Aggregator.as_str() && self.aggregator_awaiting_ack {
                    self.aggregator = None;
                    self.aggregator_awaiting_ack = false;
                } else if role == ProbeRole::Evaluator.as_str() && self.evaluator_awaiting_ack {
                    self.evaluator = None;
                    self.evaluator_awaiting_ack = false;
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
