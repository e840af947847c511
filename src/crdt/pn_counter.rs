//! Grow/shrink counter: each replica owns independent increment and
//! decrement tallies, merged by taking the element-wise max per replica.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A PN-Counter: value is `sum(increments) - sum(decrements)` across all
/// replicas, converging under merge regardless of delivery order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PnCounter {
    replica_id: String,
    increments: HashMap<String, u64>,
    decrements: HashMap<String, u64>,
}

impl PnCounter {
    pub fn new(replica_id: impl Into<String>) -> Self {
        Self {
            replica_id: replica_id.into(),
            increments: HashMap::new(),
            decrements: HashMap::new(),
        }
    }

    pub fn increment(&mut self, amount: u64) {
        *self.increments.entry(self.replica_id.clone()).or_insert(0) += amount;
    }

    pub fn decrement(&mut self, amount: u64) {
        *self.decrements.entry(self.replica_id.clone()).or_insert(0) += amount;
    }

    /// Net value across all replicas.
    pub fn value(&self) -> i64 {
        let total_p: u64 = self.increments.values().sum();
        let total_n: u64 = self.decrements.values().sum();
        total_p as i64 - total_n as i64
    }

    /// Merge `other` into `self` by taking the element-wise max of each
    /// replica's increment and decrement tallies.
    pub fn merge(&mut self, other: &Self) {
        merge_max(&mut self.increments, &other.increments);
        merge_max(&mut self.decrements, &other.decrements);
    }
}

fn merge_max(local: &mut HashMap<String, u64>, other: &HashMap<String, u64>) {
    for (replica, &count) in other {
        let entry = local.entry(replica.clone()).or_insert(0);
        *entry = (*entry).max(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_and_decrement() {
        let mut counter = PnCounter::new("a");
        counter.increment(5);
        counter.decrement(2);
        assert_eq!(counter.value(), 3);
    }

    #[test]
    fn test_merge_takes_max_per_replica() {
        let mut a = PnCounter::new("a");
        a.increment(3);
        let mut b = PnCounter::new("b");
        b.increment(5);

        a.merge(&b);
        assert_eq!(a.value(), 8);

        // Re-merging the same state must not double count.
        a.merge(&b);
        assert_eq!(a.value(), 8);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut a = PnCounter::new("a");
        a.increment(10);
        let snapshot = a.clone();
        a.merge(&snapshot);
        assert_eq!(a.value(), 10);
    }
}
