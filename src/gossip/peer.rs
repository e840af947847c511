//! A gossip peer: trains locally, publishes its model into a shared
//! last-writer-wins map, and periodically exchanges CRDT snapshots with a
//! random fanout of other peers, converging without a coordinator.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rand::seq::SliceRandom;

use super::errors::GossipError;
use crate::actor::{Actor, ActorContext, ErrorAction};
use crate::classifier::{Classifier, Metrics};
use crate::crdt::{LwwMap, PnCounter};
use crate::fl::fedavg;
use crate::message::{MessageKind, WorkerUpdate};
use crate::monitoring::{GossipEvent, GossipEventKind, RuntimeEvent};
use crate::store::RoundStore;
use crate::system::{ActorRef, GossipConfig};
use crate::util::ActorId;

/// Global recomputation only installs a new global model when it moves by
/// more than this much, so replaying an unchanged merge doesn't spuriously
/// reset the convergence counter.
const MIN_GLOBAL_APPLY_EPS: f32 = 1e-9;

pub struct GossipPeerActor {
    peer_id: String,
    advertise_host: String,
    advertise_port: u16,
    config: GossipConfig,
    num_classes: usize,
    num_features: usize,
    classifier: Box<dyn Classifier>,
    store: Arc<dyn RoundStore>,
    observer: Option<ActorRef>,

    lww: LwwMap<f32>,
    counter: PnCounter,
    known_peers: HashMap<String, ActorRef>,
    seed_refs: Vec<ActorRef>,

    round_num: u64,
    prev_global: Option<(Vec<Vec<f32>>, Vec<f32>)>,
    last_delta_norm: f32,
    last_metrics: Metrics,
    convergence_count: u32,
    stopped: bool,

    train_ticker: Option<tokio::task::JoinHandle<()>>,
    gossip_ticker: Option<tokio::task::JoinHandle<()>>,
}

impl GossipPeerActor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        peer_id: impl Into<String>,
        advertise_host: impl Into<String>,
        advertise_port: u16,
        config: GossipConfig,
        num_classes: usize,
        num_features: usize,
        classifier: Box<dyn Classifier>,
        store: Arc<dyn RoundStore>,
        observer: Option<ActorRef>,
    ) -> Self {
        Self {
            peer_id: peer_id.into(),
            advertise_host: advertise_host.into(),
            advertise_port,
            config,
            num_classes,
            num_features,
            classifier,
            store,
            observer,
            lww: LwwMap::new("peer"),
            counter: PnCounter::new("peer"),
            known_peers: HashMap::new(),
            seed_refs: Vec::new(),
            round_num: 0,
            prev_global: None,
            last_delta_norm: 0.0,
            last_metrics: Metrics::default(),
            convergence_count: 0,
            stopped: false,
            train_ticker: None,
            gossip_ticker: None,
        }
    }

    async fn emit(&self, ctx: &ActorContext, kind: GossipEventKind) {
        ctx.actor_ref()
            .system
            .record_event(RuntimeEvent::from(GossipEvent {
                timestamp: Utc::now(),
                peer_id: self.peer_id.clone(),
                event_kind: kind,
            }))
            .await;
    }

    fn model_key_w(peer_id: &str, class: usize, feature: usize) -> String {
        format!("model/{peer_id}/w/{class}/{feature}")
    }

    fn model_key_b(peer_id: &str, class: usize) -> String {
        format!("model/{peer_id}/b/{class}")
    }

    fn model_key_n(peer_id: &str) -> String {
        format!("model/{peer_id}/n")
    }

    fn publish_local_model(&mut self, weights: &[Vec<f32>], bias: &[f32], num_samples: usize) {
        for (class, row) in weights.iter().enumerate() {
            for (feature, value) in row.iter().enumerate() {
                self.lww.set(Self::model_key_w(&self.peer_id, class, feature), *value);
            }
        }
        for (class, value) in bias.iter().enumerate() {
            self.lww.set(Self::model_key_b(&self.peer_id, class), *value);
        }
        self.lww.set(Self::model_key_n(&self.peer_id), num_samples as f32);
        self.counter.increment(1);
    }

    /// Scan every `"model/<id>/..."` key group present in the LWWMap,
    /// rejecting any peer whose shape doesn't match this peer's own
    /// `(num_classes, num_features)` or whose sample count is missing.
    fn decode_models(&self) -> Vec<WorkerUpdate> {
        let mut ids: Vec<String> = self
            .lww
            .iter()
            .filter_map(|(key, _)| key.strip_prefix("model/")?.split('/').next().map(str::to_string))
            .collect();
        ids.sort();
        ids.dedup();

        let mut updates = Vec::new();
        for id in ids {
            let mut weights = vec![vec![0.0f32; self.num_features]; self.num_classes];
            let mut complete = true;
            for (class, row) in weights.iter_mut().enumerate() {
                for (feature, slot) in row.iter_mut().enumerate() {
                    match self.lww.get(&Self::model_key_w(&id, class, feature)) {
                        Some(value) => *slot = *value,
                        None => complete = false,
                    }
                }
            }
            let mut bias = vec![0.0f32; self.num_classes];
            for (class, slot) in bias.iter_mut().enumerate() {
                match self.lww.get(&Self::model_key_b(&id, class)) {
                    Some(value) => *slot = *value,
                    None => complete = false,
                }
            }
            let num_samples = match self.lww.get(&Self::model_key_n(&id)) {
                Some(value) if *value >= 1.0 => *value as usize,
                _ => {
                    complete = false;
                    0
                }
            };
            if complete {
                updates.push(WorkerUpdate { worker_id: id, weights, bias, num_samples, loss: 0.0 });
            }
        }
        updates
    }

    /// Weighted-average every known peer model and install it as the new
    /// global if it moved by more than [`MIN_GLOBAL_APPLY_EPS`] (or there
    /// was no prior global to compare against).
    async fn recompute_global(&mut self, ctx: &ActorContext) -> (Vec<Vec<f32>>, Vec<f32>) {
        let updates = self.decode_models();
        if let Ok((weights, bias)) = fedavg(self.round_num, &updates) {
            let delta = delta_norm(&self.prev_global, &weights, &bias);
            if self.prev_global.is_none() || delta > MIN_GLOBAL_APPLY_EPS {
                self.prev_global = Some((weights, bias));
                self.last_delta_norm = delta;
                self.emit(ctx, GossipEventKind::GlobalModelApplied { delta_norm: delta }).await;
            }
        }
        self.prev_global.clone().unwrap_or_else(|| {
            (vec![vec![0.0; self.num_features]; self.num_classes], vec![0.0; self.num_classes])
        })
    }

    fn select_targets(&self) -> Vec<ActorRef> {
        let mut candidates: Vec<ActorRef> = self
            .known_peers
            .iter()
            .filter(|(id, _)| id.as_str() != self.peer_id)
            .map(|(_, reference)| reference.clone())
            .collect();
        candidates.extend(self.seed_refs.iter().cloned());

        let n = self.config.fanout.min(candidates.len());
        let mut rng = rand::thread_rng();
        candidates.shuffle(&mut rng);
        candidates.truncate(n);
        candidates
    }

    async fn run_training_round(&mut self, ctx: &mut ActorContext) {
        if self.stopped || self.round_num >= self.config.max_rounds {
            self.stopped = true;
            return;
        }

        let (global_weights, global_bias) = self.recompute_global(ctx).await;
        self.round_num += 1;
        self.classifier.set_weights(global_weights, global_bias);

        let mut metrics = Metrics::default();
        for _ in 0..self.config.local_epochs.max(1) {
            metrics = self.classifier.train_epoch(self.config.batch_size, self.config.learning_rate, None);
        }
        self.last_metrics = metrics;

        let (trained_weights, trained_bias) = self.classifier.weights();
        let num_samples = self.classifier.num_samples();
        self.publish_local_model(&trained_weights, &trained_bias, num_samples);
        self.recompute_global(ctx).await;

        self.store.put_gossip_snapshot(&self.peer_id, self.round_num, self.lww.clone(), self.counter.clone());
        self.store.put_gossip_metrics(&self.peer_id, self.round_num, metrics.loss, metrics.accuracy);
        self.emit(
            ctx,
            GossipEventKind::RoundTrained { round: self.round_num, loss: metrics.loss, accuracy: metrics.accuracy },
        )
        .await;
    }

    /// Only the gossip loop advances the convergence counter, so detection
    /// tracks sustained steady-state rather than one noisy training step.
    async fn run_gossip_round(&mut self, ctx: &mut ActorContext) {
        if self.stopped {
            return;
        }

        if self.last_delta_norm < self.config.convergence_eps {
            self.convergence_count += 1;
        } else {
            self.convergence_count = 0;
        }
        if self.convergence_count >= self.config.convergence_patience {
            self.stopped = true;
            self.emit(ctx, GossipEventKind::ConvergenceReached).await;
            return;
        }

        let targets = self.select_targets();
        let state = MessageKind::GossipState {
            peer_id: self.peer_id.clone(),
            round: self.round_num,
            weights: self.lww.clone(),
            sample_counts: self.counter.clone(),
            loss: self.last_metrics.loss,
            accuracy: self.last_metrics.accuracy,
        };
        let membership = MessageKind::MembershipUpdate {
            peers: vec![(self.peer_id.clone(), self.advertise_host.clone(), self.advertise_port)],
        };
        for target in &targets {
            let _ = target.tell_from(state.clone(), Some(ctx.actor_ref().clone())).await;
            let _ = target.tell_from(membership.clone(), Some(ctx.actor_ref().clone())).await;
        }
        self.emit(ctx, GossipEventKind::GossipSent { targets: targets.len() }).await;

        if let Some(observer) = &self.observer {
            let _ = observer.tell_from(state, Some(ctx.actor_ref().clone())).await;
        }
    }

    fn learn_peer(&mut self, peer_id: String, actor_ref: ActorRef) {
        if peer_id != self.peer_id {
            self.known_peers.insert(peer_id, actor_ref);
        }
    }
}

fn delta_norm(prev: &Option<(Vec<Vec<f32>>, Vec<f32>)>, weights: &[Vec<f32>], bias: &[f32]) -> f32 {
    let Some((prev_weights, prev_bias)) = prev else { return 0.0 };
    let mut sum_sq = 0.0f32;
    for (new_row, old_row) in weights.iter().zip(prev_weights.iter()) {
        for (new_value, old_value) in new_row.iter().zip(old_row.iter()) {
            sum_sq += (new_value - old_value).powi(2);
        }
    }
    for (new_value, old_value) in bias.iter().zip(prev_bias.iter()) {
        sum_sq += (new_value - old_value).powi(2);
    }
    sum_sq.sqrt()
}

#[async_trait]
impl Actor for GossipPeerActor {
    type Error = GossipError;

    async fn pre_start(&mut self, ctx: &mut ActorContext) -> Result<(), Self::Error> {
        for seed in self.config.seed_peers.clone() {
            let addr: SocketAddr = seed.parse().map_err(|_| GossipError::InvalidSeedAddr(seed.clone()))?;
            let seed_ref = ActorRef {
                actor_id: ActorId::from(addr.to_string()),
                system: Arc::clone(&ctx.actor_ref().system),
                remote_addr: Some(addr),
            };
            let _ = seed_ref
                .tell_from(
                    MessageKind::GossipPeerJoin {
                        peer_id: self.peer_id.clone(),
                        host: self.advertise_host.clone(),
                        port: self.advertise_port,
                    },
                    Some(ctx.actor_ref().clone()),
                )
                .await;
            self.seed_refs.push(seed_ref);
        }

        self.lww.set("peer_id", 0.0);
        self.counter.increment(0);
        self.recompute_global(ctx).await;

        let train_self = ctx.actor_ref().clone();
        self.train_ticker = Some(tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(2)).await;
            loop {
                if train_self.tell(MessageKind::GossipTrainTick).await.is_err() {
                    break;
                }
                tokio::time::sleep(std::time::Duration::from_secs(2)).await;
            }
        }));

        let gossip_self = ctx.actor_ref().clone();
        let gossip_interval = self.config.gossip_interval;
        self.gossip_ticker = Some(tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(2)).await;
            let mut ticker = tokio::time::interval(gossip_interval);
            loop {
                ticker.tick().await;
                if gossip_self.tell(MessageKind::GossipTick).await.is_err() {
                    break;
                }
            }
        }));

        Ok(())
    }

    async fn post_stop(&mut self, _ctx: &mut ActorContext) -> Result<(), Self::Error> {
        if let Some(ticker) = self.train_ticker.take() {
            ticker.abort();
        }
        if let Some(ticker) = self.gossip_ticker.take() {
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
            MessageKind::GossipTrainTick => self.run_training_round(ctx).await,
            MessageKind::GossipTick => self.run_gossip_round(ctx).await,
            MessageKind::GossipState { peer_id, weights, sample_counts, .. } => {
                self.lww.merge(&weights);
                self.counter.merge(&sample_counts);
                if let Some(sender) = ctx.sender().cloned() {
                    self.learn_peer(peer_id.clone(), sender);
                }
                self.emit(ctx, GossipEventKind::GossipReceived { from: peer_id }).await;
                self.recompute_global(ctx).await;
            }
            MessageKind::MembershipUpdate { peers } => {
                for (peer_id, host, port) in peers {
                    if peer_id == self.peer_id || self.known_peers.contains_key(&peer_id) {
                        continue;
                    }
                    if let Ok(addr) = format!("{host}:{port}").parse::<SocketAddr>() {
                        let actor_ref = ActorRef {
                            actor_id: ActorId::from(addr.to_string()),
                            system: Arc::clone(&ctx.actor_ref().system),
                            remote_addr: Some(addr),
                        };
                        self.learn_peer(peer_id, actor_ref);
                    }
                }
            }
            MessageKind::GossipPeerJoin { peer_id, host, port } => {
                if peer_id != self.peer_id {
                    let actor_ref = ctx.sender().cloned().unwrap_or_else(|| {
                        let addr: SocketAddr = format!("{host}:{port}").parse().unwrap_or_else(|_| {
                            SocketAddr::from(([127, 0, 0, 1], 0))
                        });
                        ActorRef {
                            actor_id: ActorId::from(addr.to_string()),
                            system: Arc::clone(&ctx.actor_ref().system),
                            remote_addr: Some(addr),
                        }
                    });
                    self.learn_peer(peer_id, actor_ref);
                }
            }
            MessageKind::HealthPing => ctx.reply(MessageKind::HealthAck).await,
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
    use crate::store::InMemoryRoundStore;
    use crate::system::{ActorSystem, RuntimeConfig};
    use std::time::Duration;

    fn config() -> GossipConfig {
        GossipConfig {
            fanout: 2,
            gossip_interval: Duration::from_millis(50),
            local_epochs: 1,
            batch_size: 4,
            learning_rate: 0.1,
            convergence_eps: 1e-3,
            convergence_patience: 3,
            max_rounds: 5,
            seed_peers: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_publish_and_decode_round_trips_own_model() {
        let system = ActorSystem::new(RuntimeConfig::default());
        let store = Arc::new(InMemoryRoundStore::new());
        let peer_ref = system
            .actor_of(
                "gossip_peer",
                "peer-a",
                GossipPeerActor::new(
                    "peer-a",
                    "127.0.0.1",
                    0,
                    config(),
                    2,
                    2,
                    Box::new(LinearSoftmax::new(1, 2, 2, 20)),
                    Arc::clone(&store),
                    None,
                ),
            )
            .await
            .expect("spawn peer");

        peer_ref
            .ask(MessageKind::HealthPing, Duration::from_millis(200))
            .await
            .expect("health ping");
    }

    #[tokio::test]
    async fn test_gossip_state_merges_remote_model_into_local_lww() {
        let system = ActorSystem::new(RuntimeConfig::default());
        let store = Arc::new(InMemoryRoundStore::new());
        let mut peer = GossipPeerActor::new(
            "peer-a",
            "127.0.0.1",
            0,
            config(),
            1,
            1,
            Box::new(LinearSoftmax::new(1, 1, 1, 20)),
            Arc::clone(&store),
            None,
        );

        let mut remote_lww = LwwMap::new("peer-b");
        remote_lww.set("model/peer-b/w/0/0", 1.0);
        remote_lww.set("model/peer-b/b/0", 0.5);
        remote_lww.set("model/peer-b/n", 10.0);

        peer.lww.merge(&remote_lww);
        let updates = peer.decode_models();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].worker_id, "peer-b");
        assert_eq!(updates[0].num_samples, 10);

        let _ = system;
    }

    /// Five consecutive gossip rounds with a near-zero observed delta should
    /// flip `stopped` and stop short of emitting another gossip round.
    #[tokio::test]
    async fn test_five_quiet_gossip_rounds_trip_convergence() {
        let system = ActorSystem::new(RuntimeConfig::default());
        let store = Arc::new(InMemoryRoundStore::new());
        let mut cfg = config();
        cfg.convergence_patience = 5;
        let mut peer = GossipPeerActor::new(
            "peer-a",
            "127.0.0.1",
            0,
            cfg,
            1,
            1,
            Box::new(LinearSoftmax::new(1, 1, 1, 10)),
            Arc::clone(&store),
            None,
        );
        peer.last_delta_norm = 0.0;

        let self_ref = ActorRef {
            actor_id: ActorId::from("peer-a"),
            system: system.internal(),
            remote_addr: None,
        };
        let mut ctx = ActorContext::new(self_ref, None);

        assert!(!peer.stopped);
        for round in 1..=5 {
            peer.run_gossip_round(&mut ctx).await;
            if round < 5 {
                assert!(!peer.stopped, "should not converge before patience is met");
            }
        }
        assert!(peer.stopped, "five quiet rounds should trip convergence");
        assert_eq!(peer.convergence_count, 5);

        // A sixth round must be a no-op: no further gossip is sent once
        // stopped, and the counter does not keep climbing.
        peer.run_gossip_round(&mut ctx).await;
        assert_eq!(peer.convergence_count, 5);
    }
}
