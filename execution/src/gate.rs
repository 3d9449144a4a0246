//! Score submission gate.
//!
//! A thin policy between the game and the score-persistence collaborator: a
//! minimum-interval throttle invoked once per terminal transition. The gate
//! never retries and never times out; whether the downstream write lands is
//! the collaborator's problem and must not block "play again".

use digbust_types::SubmissionRecord;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Downstream persistence failure. Reported, never fatal to gameplay.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("score sink unavailable: {0}")]
    Unavailable(&'static str),
    #[error("score sink rejected the record: {0}")]
    Rejected(String),
}

/// Collaborator that persists submission records. Fire-and-forget from the
/// gate's perspective.
pub trait ScoreSink {
    fn record(&mut self, record: &SubmissionRecord) -> Result<(), SinkError>;
}

/// Why a submission was not forwarded. Not an error; an expected policy
/// outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Cooldown { elapsed_ms: u64, required_ms: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The gate forwarded the record. `downstream` carries the collaborator
    /// result for reporting; it does not affect the gate's own state.
    Accepted { downstream: Result<(), SinkError> },
    Rejected(RejectReason),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted { .. })
    }
}

/// Minimum-interval throttle over score submissions.
#[derive(Debug, Clone)]
pub struct SubmitGate {
    cooldown_ms: u64,
    last_submit_ms: Option<u64>,
}

impl SubmitGate {
    pub fn new(cooldown_ms: u64) -> Self {
        Self {
            cooldown_ms,
            last_submit_ms: None,
        }
    }

    /// Forward `record` to the sink unless a submission was accepted less
    /// than the cooldown ago. On acceptance the throttle timestamp advances
    /// to `now_ms` whether or not the downstream write succeeds.
    pub fn submit(
        &mut self,
        record: &SubmissionRecord,
        now_ms: u64,
        sink: &mut impl ScoreSink,
    ) -> SubmitOutcome {
        if let Some(last) = self.last_submit_ms {
            let elapsed_ms = now_ms.saturating_sub(last);
            if elapsed_ms < self.cooldown_ms {
                debug!(
                    player = %record.player_id,
                    elapsed_ms,
                    required_ms = self.cooldown_ms,
                    "score submission rate limited"
                );
                return SubmitOutcome::Rejected(RejectReason::Cooldown {
                    elapsed_ms,
                    required_ms: self.cooldown_ms,
                });
            }
        }

        self.last_submit_ms = Some(now_ms);
        let downstream = sink.record(record);
        match &downstream {
            Ok(()) => info!(
                player = %record.player_id,
                score = record.score,
                digs = record.digs,
                outcome = record.outcome.as_str(),
                "score submitted"
            ),
            Err(err) => warn!(
                player = %record.player_id,
                %err,
                "score submission failed downstream (not retried)"
            ),
        }
        SubmitOutcome::Accepted { downstream }
    }
}
