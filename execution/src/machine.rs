//! Session state machine.
//!
//! `Playing` is the only state that accepts a dig; `Busted` and `Jackpot`
//! are terminal and a session in either is replaced, never resumed. The
//! caller is responsible for triggering score submission when a dig returns
//! a terminal decision (see [`crate::table::DigTable`], which does exactly
//! that once per session).

use digbust_types::{DigOutcome, GameConfig, Session, SessionStatus, SessionView};
use thiserror::Error;

use crate::engine::{decide, Decision};
use crate::rng::UnitRng;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    /// Dig on a terminal session. A usage error, never a gameplay outcome;
    /// the session is left untouched.
    #[error("session already complete")]
    SessionComplete,
}

/// Take one dig. On success the session has advanced by exactly one attempt
/// and `last_outcome`/`last_points` describe this dig.
pub fn dig(
    session: &mut Session,
    config: &GameConfig,
    rng: &mut impl UnitRng,
) -> Result<Decision, GameError> {
    if session.status.is_terminal() {
        return Err(GameError::SessionComplete);
    }

    // Outcome odds use the pre-increment dig count.
    let decision = decide(session.digs, config, rng);
    session.digs += 1;
    session.last_outcome = Some(decision.outcome);
    session.last_points = decision.points;

    match decision.outcome {
        DigOutcome::Bust => {
            session.status = SessionStatus::Busted;
        }
        DigOutcome::Jackpot => {
            session.score += decision.points;
            session.status = SessionStatus::Jackpot;
        }
        DigOutcome::Gem | DigOutcome::Dirt => {
            session.score += decision.points;
        }
    }

    Ok(decision)
}

/// Progress toward the diamond wall (0-100). Linear to 50% at the jackpot
/// threshold, then +2 per dig past it, saturating. Display heuristic only.
pub fn progress_to_jackpot(digs: u32, config: &GameConfig) -> f64 {
    if config.jackpot_threshold == 0 || digs >= config.jackpot_threshold {
        let over = digs.saturating_sub(config.jackpot_threshold) as f64;
        return 50.0 + (over * 2.0).min(50.0);
    }
    digs as f64 / config.jackpot_threshold as f64 * 50.0
}

/// Tiered motivational message for a progress value.
pub fn progress_message(progress: f64) -> &'static str {
    if progress < 25.0 {
        "KEEP DIGGING!"
    } else if progress < 50.0 {
        "Getting closer..."
    } else if progress < 75.0 {
        "NEAR THE DIAMOND WALL!"
    } else {
        "SO CLOSE! DON'T GIVE UP!"
    }
}

/// Assemble the display snapshot for a session.
pub fn session_view(session: &Session, config: &GameConfig) -> SessionView {
    let progress = progress_to_jackpot(session.digs, config);
    SessionView {
        score: session.score,
        digs: session.digs,
        status: session.status,
        last_outcome: session.last_outcome,
        last_points: session.last_points,
        progress,
        message: progress_message(progress),
    }
}
