//! Usage counters.
//!
//! Counters are only touched while the store lock is held, so every
//! snapshot satisfies
//! `total_notes == total_views + expired_notes + cancelled_notes + active_notes`.

use serde::{Deserialize, Serialize};

/// Process-lifetime counters fed by store events.
#[derive(Debug, Default)]
pub(crate) struct StatsCounter {
    total_notes: u64,
    total_views: u64,
    expired_notes: u64,
    cancelled_notes: u64,
}

impl StatsCounter {
    pub(crate) fn record_created(&mut self) {
        self.total_notes += 1;
    }

    pub(crate) fn record_viewed(&mut self) {
        self.total_views += 1;
    }

    pub(crate) fn record_expired(&mut self, count: u64) {
        self.expired_notes += count;
    }

    pub(crate) fn record_cancelled(&mut self) {
        self.cancelled_notes += 1;
    }

    /// Snapshot with `active_notes` taken from the live store cardinality.
    pub(crate) fn snapshot(&self, active_notes: usize) -> StatsSnapshot {
        StatsSnapshot {
            total_notes: self.total_notes,
            total_views: self.total_views,
            active_notes: active_notes as u64,
            expired_notes: self.expired_notes,
            cancelled_notes: self.cancelled_notes,
        }
    }
}

/// Read-only view of the store counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_notes: u64,
    pub total_views: u64,
    pub active_notes: u64,
    pub expired_notes: u64,
    pub cancelled_notes: u64,
}

impl StatsSnapshot {
    /// Whether every created note is accounted for exactly once.
    pub fn is_balanced(&self) -> bool {
        self.total_notes
            == self.total_views + self.expired_notes + self.cancelled_notes + self.active_notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_balance() {
        let mut counter = StatsCounter::default();
        for _ in 0..5 {
            counter.record_created();
        }
        counter.record_viewed();
        counter.record_expired(2);
        counter.record_cancelled();

        let snapshot = counter.snapshot(1);
        assert_eq!(snapshot.total_notes, 5);
        assert_eq!(snapshot.active_notes, 1);
        assert!(snapshot.is_balanced());

        assert!(!counter.snapshot(3).is_balanced());
    }
}
