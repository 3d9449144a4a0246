//! Single-player table driver.
//!
//! Owns one player's session plus the submission gate and local stats, and
//! sequences a dig end to end: evaluate the outcome, apply the state
//! transition, and on the terminal transition only, submit the final
//! tally and fold it into the best-score/attempt counters. Because a
//! terminal session rejects further digs, the submission path runs at most
//! once per play-through.

use digbust_types::{
    ConfigError, FinalOutcome, GameConfig, Session, SessionStatus, SessionView, SubmissionRecord,
};
use tracing::warn;

use crate::engine::Decision;
use crate::gate::{ScoreSink, SubmitGate, SubmitOutcome};
use crate::machine::{self, GameError};
use crate::rng::UnitRng;
use crate::stats::{LocalStats, StatsStore};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub player_id: String,
    pub display_name: String,
}

/// Everything the presentation layer needs after one dig.
#[derive(Clone, Debug)]
pub struct DigReport {
    pub decision: Decision,
    pub view: SessionView,
    /// Present only when this dig ended the session.
    pub submission: Option<SubmitOutcome>,
    /// Whether the finished session set a new best score.
    pub new_best: bool,
}

pub struct DigTable {
    config: GameConfig,
    identity: PlayerIdentity,
    session: Session,
    /// Bumped on every "play again"; keys the per-session RNG stream.
    session_nonce: u64,
    gate: SubmitGate,
    stats: LocalStats,
}

impl DigTable {
    /// Build a table, failing fast on invalid configuration.
    pub fn new(
        config: GameConfig,
        identity: PlayerIdentity,
        stats: LocalStats,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let gate = SubmitGate::new(config.submit_cooldown_ms);
        Ok(Self {
            config,
            identity,
            session: Session::new(),
            session_nonce: 0,
            gate,
            stats,
        })
    }

    /// Build a table with stats loaded from `store` (startup path).
    pub fn load(
        config: GameConfig,
        identity: PlayerIdentity,
        store: &impl StatsStore,
    ) -> Result<Self, ConfigError> {
        let stats = store.load(&identity.player_id).unwrap_or_else(|err| {
            warn!(player = %identity.player_id, %err, "stats load failed; starting fresh");
            LocalStats::default()
        });
        Self::new(config, identity, stats)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn identity(&self) -> &PlayerIdentity {
        &self.identity
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_nonce(&self) -> u64 {
        self.session_nonce
    }

    pub fn stats(&self) -> LocalStats {
        self.stats
    }

    pub fn view(&self) -> SessionView {
        machine::session_view(&self.session, &self.config)
    }

    /// Take one dig. On the terminal transition this submits the score
    /// through the gate and persists updated stats; neither step is retried
    /// or allowed to fail the dig itself.
    pub fn dig(
        &mut self,
        now_ms: u64,
        rng: &mut impl UnitRng,
        sink: &mut impl ScoreSink,
        stats_store: &mut impl StatsStore,
    ) -> Result<DigReport, GameError> {
        let decision = machine::dig(&mut self.session, &self.config, rng)?;

        let mut submission = None;
        let mut new_best = false;
        if let Some(outcome) = final_outcome(self.session.status) {
            let record = SubmissionRecord {
                player_id: self.identity.player_id.clone(),
                display_name: self.identity.display_name.clone(),
                score: self.session.score,
                digs: self.session.digs,
                outcome,
                submitted_at_ms: now_ms,
            };
            submission = Some(self.gate.submit(&record, now_ms, sink));

            new_best = self.stats.apply_terminal(self.session.score);
            if let Err(err) = stats_store.store(&self.identity.player_id, &self.stats) {
                warn!(player = %self.identity.player_id, %err, "stats store failed");
            }
        }

        Ok(DigReport {
            decision,
            view: self.view(),
            submission,
            new_best,
        })
    }

    /// Replace a finished session with a fresh one.
    pub fn play_again(&mut self) {
        self.session = Session::new();
        self.session_nonce += 1;
    }
}

fn final_outcome(status: SessionStatus) -> Option<FinalOutcome> {
    match status {
        SessionStatus::Busted => Some(FinalOutcome::Bust),
        SessionStatus::Jackpot => Some(FinalOutcome::Jackpot),
        SessionStatus::Playing => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{RecordingSink, SequenceRng};
    use crate::stats::MemoryStatsStore;
    use digbust_types::DigOutcome;

    fn table() -> DigTable {
        DigTable::new(
            GameConfig::default(),
            PlayerIdentity {
                player_id: "p1".to_string(),
                display_name: "Player One".to_string(),
            },
            LocalStats::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = GameConfig {
            gem_chance: 2.0,
            ..GameConfig::default()
        };
        let result = DigTable::new(
            config,
            PlayerIdentity {
                player_id: "p".to_string(),
                display_name: "p".to_string(),
            },
            LocalStats::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_non_terminal_dig_submits_nothing() {
        let mut table = table();
        let mut sink = RecordingSink::new();
        let mut store = MemoryStatsStore::new();
        let mut rng = SequenceRng::new(&[0.9, 0.9]);
        let report = table.dig(0, &mut rng, &mut sink, &mut store).unwrap();
        assert_eq!(report.decision.outcome, DigOutcome::Dirt);
        assert!(report.submission.is_none());
        assert!(sink.records().is_empty());
        assert_eq!(store.load("p1").unwrap(), LocalStats::default());
    }

    #[test]
    fn test_terminal_dig_submits_once_and_persists_stats() {
        let mut table = table();
        let mut sink = RecordingSink::new();
        let mut store = MemoryStatsStore::new();

        // Gem then bust.
        let mut rng = SequenceRng::new(&[0.9, 0.0, 0.5]);
        table.dig(0, &mut rng, &mut sink, &mut store).unwrap();
        let score = table.session().score;
        assert!(score > 0);

        let mut rng = SequenceRng::new(&[0.0]);
        let report = table.dig(1_000, &mut rng, &mut sink, &mut store).unwrap();
        assert_eq!(report.decision.outcome, DigOutcome::Bust);
        assert!(report.submission.as_ref().unwrap().is_accepted());
        assert!(report.new_best);

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].score, score);
        assert_eq!(records[0].digs, 2);
        assert_eq!(records[0].outcome, FinalOutcome::Bust);
        assert_eq!(records[0].submitted_at_ms, 1_000);

        let stats = store.load("p1").unwrap();
        assert_eq!(stats.best_score, score);
        assert_eq!(stats.total_attempts, 1);
    }

    #[test]
    fn test_dig_after_terminal_is_usage_error() {
        let mut table = table();
        let mut sink = RecordingSink::new();
        let mut store = MemoryStatsStore::new();
        let mut rng = SequenceRng::new(&[0.0]);
        table.dig(0, &mut rng, &mut sink, &mut store).unwrap();

        let mut rng = SequenceRng::new(&[0.0]);
        assert!(matches!(
            table.dig(10, &mut rng, &mut sink, &mut store),
            Err(GameError::SessionComplete)
        ));
        assert_eq!(sink.records().len(), 1, "no duplicate submission");
    }

    #[test]
    fn test_play_again_resets_session_and_bumps_nonce() {
        let mut table = table();
        let mut sink = RecordingSink::new();
        let mut store = MemoryStatsStore::new();
        let mut rng = SequenceRng::new(&[0.0]);
        table.dig(0, &mut rng, &mut sink, &mut store).unwrap();
        assert!(table.session().status.is_terminal());

        table.play_again();
        assert_eq!(table.session(), &Session::new());
        assert_eq!(table.session_nonce(), 1);

        // A new session is playable again.
        let mut rng = SequenceRng::new(&[0.9, 0.9]);
        let report = table.dig(20, &mut rng, &mut sink, &mut store).unwrap();
        assert_eq!(report.decision.outcome, DigOutcome::Dirt);
    }

    #[test]
    fn test_rapid_terminal_sessions_hit_cooldown() {
        let mut table = table();
        let mut sink = RecordingSink::new();
        let mut store = MemoryStatsStore::new();

        let mut rng = SequenceRng::new(&[0.0]);
        let first = table.dig(0, &mut rng, &mut sink, &mut store).unwrap();
        assert!(first.submission.unwrap().is_accepted());

        table.play_again();
        let mut rng = SequenceRng::new(&[0.0]);
        let second = table.dig(2_000, &mut rng, &mut sink, &mut store).unwrap();
        assert!(
            !second.submission.unwrap().is_accepted(),
            "second terminal within cooldown must be rate limited"
        );
        assert_eq!(sink.records().len(), 1);
        // Stats still advance even when the submission is throttled.
        assert_eq!(store.load("p1").unwrap().total_attempts, 2);
    }

    #[test]
    fn test_downstream_failure_does_not_block_play_again() {
        let mut table = table();
        let mut sink = RecordingSink::failing();
        let mut store = MemoryStatsStore::new();
        let mut rng = SequenceRng::new(&[0.0]);
        let report = table.dig(0, &mut rng, &mut sink, &mut store).unwrap();
        assert!(report.submission.unwrap().is_accepted());
        assert!(table.session().status.is_terminal());
        table.play_again();
        assert_eq!(table.session().status, SessionStatus::Playing);
    }
}
