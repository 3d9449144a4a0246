//! Common types for the digbust mining game.
//!
//! Everything here is plain data: configuration, session state, submission
//! records, and the display snapshot consumed by presentation layers. Game
//! logic lives in `digbust-execution`.

mod config;
mod constants;
mod session;
mod submission;

pub use config::{ConfigError, GameConfig};
pub use constants::*;
pub use session::{DigOutcome, Session, SessionStatus, SessionView};
pub use submission::{FinalOutcome, ScoreRow, SubmissionInvariantError, SubmissionRecord};
