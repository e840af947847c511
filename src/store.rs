//! Persistence contract for training artifacts.
//!
//! A real deployment supplies a file- or database-backed implementation of
//! [`RoundStore`]; that implementation is out of scope here the same way
//! [`crate::classifier::Classifier`]'s numeric internals are. This module
//! gives the coordinator/aggregator/gossip-peer code a concrete trait to
//! call and a `DashMap`-backed reference implementation for tests and
//! examples.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::crdt::{LwwMap, PnCounter};

/// One orchestrated round's persisted artifacts. The aggregator and the
/// evaluator each write a subset of these columns for the same `round`; a
/// later write only overwrites the columns it supplies, leaving the rest
/// as the prior writer left them.
#[derive(Debug, Clone)]
pub struct RoundRecord {
    pub weights_blob: Option<Vec<u8>>,
    pub train_metrics_json: Option<String>,
    pub eval_metrics_json: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// One gossip peer's persisted CRDT snapshot for a round.
#[derive(Debug, Clone)]
pub struct GossipSnapshotRecord {
    pub lww: LwwMap<f32>,
    pub pn: PnCounter,
    pub timestamp: DateTime<Utc>,
}

/// One gossip peer's persisted training metrics for a round.
#[derive(Debug, Clone, Copy)]
pub struct GossipMetricsRecord {
    pub loss: f32,
    pub accuracy: f32,
    pub timestamp: DateTime<Utc>,
}

/// Persistence contract, keyed by primary key with last-writer-wins
/// semantics: a later call for the same key overwrites the earlier record
/// rather than appending.
pub trait RoundStore: Send + Sync {
    /// Write the given columns for `round`, leaving any column passed as
    /// `None` as the previous writer left it (or absent, if this is the
    /// first write for `round`).
    fn put_round(
        &self,
        round: u64,
        weights_blob: Option<Vec<u8>>,
        train_metrics_json: Option<String>,
        eval_metrics_json: Option<String>,
    );

    fn put_gossip_snapshot(&self, peer_id: &str, round: u64, lww: LwwMap<f32>, pn: PnCounter);

    fn put_gossip_metrics(&self, peer_id: &str, round: u64, loss: f32, accuracy: f32);
}

/// Reference [`RoundStore`] backed by in-process `DashMap`s. Nothing here
/// survives process restart; a real deployment swaps this for a file- or
/// database-backed store behind the same trait.
#[derive(Default)]
pub struct InMemoryRoundStore {
    rounds: DashMap<u64, RoundRecord>,
    gossip_snapshots: DashMap<(String, u64), GossipSnapshotRecord>,
    gossip_metrics: DashMap<(String, u64), GossipMetricsRecord>,
}

impl InMemoryRoundStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_round(&self, round: u64) -> Option<RoundRecord> {
        self.rounds.get(&round).map(|r| r.clone())
    }

    pub fn get_gossip_snapshot(&self, peer_id: &str, round: u64) -> Option<GossipSnapshotRecord> {
        self.gossip_snapshots
            .get(&(peer_id.to_string(), round))
            .map(|r| r.clone())
    }

    pub fn get_gossip_metrics(&self, peer_id: &str, round: u64) -> Option<GossipMetricsRecord> {
        self.gossip_metrics.get(&(peer_id.to_string(), round)).map(|r| *r)
    }
}

impl RoundStore for InMemoryRoundStore {
    fn put_round(
        &self,
        round: u64,
        weights_blob: Option<Vec<u8>>,
        train_metrics_json: Option<String>,
        eval_metrics_json: Option<String>,
    ) {
        self.rounds
            .entry(round)
            .and_modify(|existing| {
                if weights_blob.is_some() {
                    existing.weights_blob = weights_blob.clone();
                }
                if train_metrics_json.is_some() {
                    existing.train_metrics_json = train_metrics_json.clone();
                }
                if eval_metrics_json.is_some() {
                    existing.eval_metrics_json = eval_metrics_json.clone();
                }
                existing.timestamp = Utc::now();
            })
            .or_insert_with(|| RoundRecord {
                weights_blob,
                train_metrics_json,
                eval_metrics_json,
                timestamp: Utc::now(),
            });
    }

    fn put_gossip_snapshot(&self, peer_id: &str, round: u64, lww: LwwMap<f32>, pn: PnCounter) {
        self.gossip_snapshots.insert(
            (peer_id.to_string(), round),
            GossipSnapshotRecord {
                lww,
                pn,
                timestamp: Utc::now(),
            },
        );
    }

    fn put_gossip_metrics(&self, peer_id: &str, round: u64, loss: f32, accuracy: f32) {
        self.gossip_metrics.insert(
            (peer_id.to_string(), round),
            GossipMetricsRecord {
                loss,
                accuracy,
                timestamp: Utc::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_round_merges_columns_across_writers() {
        let store = InMemoryRoundStore::new();
        store.put_round(1, Some(vec![1, 2, 3]), Some("{}".to_string()), None);
        store.put_round(1, None, None, Some("{\"accuracy\":0.9}".to_string()));

        let record = store.get_round(1).expect("round present");
        assert_eq!(record.weights_blob, Some(vec![1, 2, 3]));
        assert_eq!(record.train_metrics_json, Some("{}".to_string()));
        assert_eq!(record.eval_metrics_json, Some("{\"accuracy\":0.9}".to_string()));
    }

    #[test]
    fn test_gossip_snapshot_keyed_by_peer_and_round() {
        let store = InMemoryRoundStore::new();
        store.put_gossip_snapshot("peer-a", 3, LwwMap::new("peer-a"), PnCounter::new("peer-a"));
        assert!(store.get_gossip_snapshot("peer-a", 3).is_some());
        assert!(store.get_gossip_snapshot("peer-a", 4).is_none());
        assert!(store.get_gossip_snapshot("peer-b", 3).is_none());
    }

    #[test]
    fn test_gossip_metrics_round_trip() {
        let store = InMemoryRoundStore::new();
        store.put_gossip_metrics("peer-a", 1, 0.5, 0.9);
        let record = store.get_gossip_metrics("peer-a", 1).expect("metrics present");
        assert_eq!(record.loss, 0.5);
        assert_eq!(record.accuracy, 0.9);
    }
}
