//! Digbust execution layer.
//!
//! This crate contains the deterministic dig-outcome logic and the session
//! state machines driven by it.
//!
//! ## Determinism requirements
//! - Do not use wall-clock time inside execution; callers pass timestamps in.
//! - Do not use ambient randomness; every draw comes from the injected
//!   [`UnitRng`] capability, so any run can be replayed from a seed.
//!
//! The primary entrypoint for a full play-through is [`DigTable`]; the pure
//! outcome model is [`engine::decide`].

pub mod engine;
pub mod gate;
pub mod machine;
pub mod rng;
pub mod stats;
pub mod table;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub use engine::{decide, Decision};
pub use gate::{RejectReason, ScoreSink, SinkError, SubmitGate, SubmitOutcome};
pub use machine::{dig, progress_message, progress_to_jackpot, session_view, GameError};
pub use rng::{DigRng, EntropyRng, UnitRng};
pub use stats::{LocalStats, MemoryStatsStore, StatsError, StatsStore};
pub use table::{DigReport, DigTable, PlayerIdentity};
