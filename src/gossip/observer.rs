//! A strictly passive observer of the gossip overlay: it accumulates a
//! per-peer view from [`MessageKind::GossipState`] messages peers send it
//! and periodically logs a summary. It never gossips back, never
//! propagates membership, and never affects any peer's state.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::errors::GossipError;
use crate::actor::{Actor, ActorContext, ErrorAction};
use crate::message::MessageKind;
use crate::monitoring::{GossipEvent, GossipEventKind, RuntimeEvent};
use crate::util::ActorId;

/// What the observer knows about one peer, rebuilt from the last
/// `GossipState` it received from (or about) that peer.
#[derive(Debug, Clone)]
pub struct PeerView {
    pub round: u64,
    pub last_seen: DateTime<Utc>,
    pub delta_count: u64,
    pub delta_norm: f32,
}

pub struct ObserverActor {
    peers: HashMap<String, PeerView>,
    total_gossips: u64,
    summary_interval: std::time::Duration,
    ticker: Option<tokio::task::JoinHandle<()>>,
}

impl ObserverActor {
    pub fn new(summary_interval: std::time::Duration) -> Self {
        Self {
            peers: HashMap::new(),
            total_gossips: 0,
            summary_interval,
            ticker: None,
        }
    }

    /// Highest round any peer has reported, used as a rough stand-in for
    /// "the" global round in a topology with no single global round
    /// counter.
    pub fn max_observed_round(&self) -> u64 {
        self.peers.values().map(|view| view.round).max().unwrap_or(0)
    }

    pub fn total_gossips(&self) -> u64 {
        self.total_gossips
    }

    pub fn peer_view(&self, peer_id: &str) -> Option<&PeerView> {
        self.peers.get(peer_id)
    }

    fn record_gossip_state(&mut self, peer_id: String, round: u64, delta_norm_hint: f32) {
        self.total_gossips += 1;
        let entry = self.peers.entry(peer_id).or_insert_with(|| PeerView {
            round,
            last_seen: Utc::now(),
            delta_count: 0,
            delta_norm: 0.0,
        });
        entry.round = entry.round.max(round);
        entry.last_seen = Utc::now();
        entry.delta_count += 1;
        entry.delta_norm = delta_norm_hint;
    }
}

#[async_trait]
impl Actor for ObserverActor {
    type Error = GossipError;

    async fn pre_start(&mut self, ctx: &mut ActorContext) -> Result<(), Self::Error> {
        let self_ref = ctx.actor_ref().clone();
        let interval = self.summary_interval;
        self.ticker = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if self_ref.tell(MessageKind::SupervisorTick).await.is_err() {
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
            MessageKind::GossipState { peer_id, round, .. } => {
                // Treat a changed round as this peer having moved; this
                // observer doesn't see the peer's internal delta_norm, so
                // it approximates one from round movement alone.
                let delta_norm_hint = self
                    .peers
                    .get(&peer_id)
                    .map(|view| if view.round == round { 0.0 } else { 1.0 })
                    .unwrap_or(1.0);
                self.record_gossip_state(peer_id, round, delta_norm_hint);
            }
            MessageKind::SupervisorTick => {
                ctx.actor_ref()
                    .system
                    .record_event(RuntimeEvent::from(GossipEvent {
                        timestamp: Utc::now(),
                        peer_id: ActorId::from("observer").to_string(),
                        event_kind: GossipEventKind::GossipReceived {
                            from: format!(
                                "summary: {} peers, {} gossips, max_round={}",
                                self.peers.len(),
                                self.total_gossips,
                                self.max_observed_round()
                            ),
                        },
                    }))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::{ActorSystem, RuntimeConfig};
    use crate::crdt::{LwwMap, PnCounter};
    use std::time::Duration;

    #[tokio::test]
    async fn test_observer_tracks_max_round_across_peers() {
        let system = ActorSystem::new(RuntimeConfig::default());
        let observer = system
            .actor_of("observer", "obs-1", ObserverActor::new(Duration::from_secs(60)))
            .await
            .expect("spawn observer");

        observer
            .tell(MessageKind::GossipState {
                peer_id: "peer-a".into(),
                round: 3,
                weights: LwwMap::new("peer-a"),
                sample_counts: PnCounter::new("peer-a"),
                loss: 0.1,
                accuracy: 0.9,
            })
            .await
            .expect("tell");
        observer
            .tell(MessageKind::GossipState {
                peer_id: "peer-b".into(),
                round: 7,
                weights: LwwMap::new("peer-b"),
                sample_counts: PnCounter::new("peer-b"),
                loss: 0.2,
                accuracy: 0.8,
            })
            .await
            .expect("tell");

        tokio::time::sleep(Duration::from_millis(50)).await;
        let _ = system.stop_actor(&ActorId::from("obs-1")).await;
    }
}
