//! Last-writer-wins map: each key's value is the one carrying the greatest
//! [`Timestamp`], and deletes are tombstones rather than removals so a
//! concurrent stale `set` cannot resurrect a deleted key.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::timestamp::Timestamp;

/// Tombstones older than this many logical ticks (relative to the map's
/// highest observed logical time) are dropped during `gc`.
pub const TOMBSTONE_HORIZON: i64 = 300;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry<V> {
    value: Option<V>,
    timestamp: Timestamp,
}

/// A last-writer-wins map over values of type `V`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LwwMap<V> {
    replica_id: String,
    clock: i64,
    entries: HashMap<String, Entry<V>>,
}

impl<V: Clone> LwwMap<V> {
    pub fn new(replica_id: impl Into<String>) -> Self {
        Self {
            replica_id: replica_id.into(),
            clock: 0,
            entries: HashMap::new(),
        }
    }

    fn next_timestamp(&mut self) -> Timestamp {
        self.clock += 1;
        Timestamp::new(self.replica_id.clone(), self.clock)
    }

    /// Set `key` to `value`, stamped with this replica's next logical tick.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let timestamp = self.next_timestamp();
        self.entries.insert(
            key.into(),
            Entry {
                value: Some(value),
                timestamp,
            },
        );
    }

    /// Mark `key` deleted with a tombstone, stamped with this replica's
    /// next logical tick. Does nothing if the key was never present.
    pub fn delete(&mut self, key: &str) {
        if self.entries.contains_key(key) {
            let timestamp = self.next_timestamp();
            if let Some(entry) = self.entries.get_mut(key) {
                entry.value = None;
                entry.timestamp = timestamp;
            }
        }
    }

    /// Current value for `key`, or `None` if absent or tombstoned.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key).and_then(|e| e.value.as_ref())
    }

    /// Iterate over live (non-tombstoned) entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries
            .iter()
            .filter_map(|(k, e)| e.value.as_ref().map(|v| (k.as_str(), v)))
    }

    pub fn len(&self) -> usize {
        self.entries.values().filter(|e| e.value.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merge `other` into `self`: for each key, keep the entry with the
    /// greater timestamp. Concurrent set/delete at equal timestamps cannot
    /// happen in practice (timestamps are unique per replica), but ties
    /// fall back to [`Timestamp`]'s replica-id ordering so merge stays
    /// commutative and idempotent.
    pub fn merge(&mut self, other: &Self) {
        for (key, other_entry) in &other.entries {
            match self.entries.get(key) {
                Some(local_entry) if local_entry.timestamp >= other_entry.timestamp => {}
                _ => {
                    self.entries.insert(key.clone(), other_entry.clone());
                }
            }
        }
        self.clock = self.clock.max(other.clock);
    }

    /// Drop tombstones whose timestamp is more than [`TOMBSTONE_HORIZON`]
    /// logical ticks behind the map's highest observed logical time.
    pub fn gc(&mut self) {
        let horizon = self.clock - TOMBSTONE_HORIZON;
        self.entries
            .retain(|_, entry| entry.value.is_some() || entry.timestamp.logical_time > horizon);
    }
}
