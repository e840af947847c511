//! Hybrid logical timestamp used to total-order concurrent CRDT writes.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A `(logical_time, replica_id)` pair that gives every write in the system
/// a total order: ties in logical time are broken lexicographically by
/// replica id, so two replicas that bump their counters at the "same" tick
/// never both win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub replica_id: String,
    pub logical_time: i64,
}

impl Timestamp {
    pub fn new(replica_id: impl Into<String>, logical_time: i64) -> Self {
        Self {
            replica_id: replica_id.into(),
            logical_time,
        }
    }

    /// Returns a timestamp advanced past both `self` and `other`, keeping
    /// this replica's id. Used when applying a remote update locally.
    pub fn advanced_past(&self, other: &Timestamp) -> Self {
        Self {
            replica_id: self.replica_id.clone(),
            logical_time: self.logical_time.max(other.logical_time) + 1,
        }
    }

    pub fn tick(&self) -> Self {
        Self {
            replica_id: self.replica_id.clone(),
            logical_time: self.logical_time + 1,
        }
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.logical_time
            .cmp(&other.logical_time)
            .then_with(|| self.replica_id.cmp(&other.replica_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_by_logical_time_first() {
        let a = Timestamp::new("a", 1);
        let b = Timestamp::new("z", 2);
        assert!(a < b);
    }

    #[test]
    fn test_tie_break_by_replica_id() {
        let a = Timestamp::new("a", 5);
        let b = Timestamp::new("b", 5);
        assert!(a < b);
    }

    #[test]
    fn test_advanced_past_exceeds_both() {
        let a = Timestamp::new("a", 3);
        let b = Timestamp::new("b", 7);
        let advanced = a.advanced_past(&b);
        assert_eq!(advanced.replica_id, "a");
        assert_eq!(advanced.logical_time, 8);
    }
}
