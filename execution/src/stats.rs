//! Best-score / attempt-count bookkeeping.
//!
//! Per-player counters live behind a small key-value store trait so the
//! backend can persist them and tests can run in memory.

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("stats store unavailable: {0}")]
    Unavailable(String),
}

/// Process-wide counters updated after each terminal transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LocalStats {
    /// Highest final score seen across sessions.
    pub best_score: u64,
    /// Completed play-throughs (terminal transitions), not digs.
    pub total_attempts: u64,
}

impl LocalStats {
    /// Fold one finished session in. Best score moves only when exceeded;
    /// the attempt counter always advances. Returns whether a new best was
    /// set.
    pub fn apply_terminal(&mut self, final_score: u64) -> bool {
        self.total_attempts += 1;
        if final_score > self.best_score {
            self.best_score = final_score;
            return true;
        }
        false
    }
}

/// Persistence for [`LocalStats`], read at startup and written after each
/// terminal transition.
pub trait StatsStore {
    fn load(&self, player_id: &str) -> Result<LocalStats, StatsError>;
    fn store(&mut self, player_id: &str, stats: &LocalStats) -> Result<(), StatsError>;
}

/// In-memory store for tests and ephemeral tables.
#[derive(Clone, Default)]
pub struct MemoryStatsStore {
    entries: Rc<RefCell<std::collections::HashMap<String, LocalStats>>>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatsStore for MemoryStatsStore {
    fn load(&self, player_id: &str) -> Result<LocalStats, StatsError> {
        Ok(self
            .entries
            .borrow()
            .get(player_id)
            .copied()
            .unwrap_or_default())
    }

    fn store(&mut self, player_id: &str, stats: &LocalStats) -> Result<(), StatsError> {
        self.entries
            .borrow_mut()
            .insert(player_id.to_string(), *stats);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_score_updates_only_on_improvement() {
        let mut stats = LocalStats::default();
        assert!(stats.apply_terminal(100));
        assert!(!stats.apply_terminal(100));
        assert!(!stats.apply_terminal(40));
        assert!(stats.apply_terminal(101));
        assert_eq!(stats.best_score, 101);
        assert_eq!(stats.total_attempts, 4);
    }

    #[test]
    fn test_attempts_count_every_terminal() {
        let mut stats = LocalStats::default();
        for _ in 0..5 {
            stats.apply_terminal(0);
        }
        assert_eq!(stats.total_attempts, 5);
        assert_eq!(stats.best_score, 0);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStatsStore::new();
        assert_eq!(store.load("p1").unwrap(), LocalStats::default());
        let stats = LocalStats {
            best_score: 42,
            total_attempts: 3,
        };
        store.store("p1", &stats).unwrap();
        assert_eq!(store.load("p1").unwrap(), stats);
        assert_eq!(store.load("p2").unwrap(), LocalStats::default());
    }
}
