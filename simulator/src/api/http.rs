use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use digbust_execution::GameError;
use digbust_types::{DigOutcome, GameConfig, ScoreRow, SessionView};

use crate::{Simulator, TableSnapshot, Window};

/// Simple health response for basic liveness checks.
#[derive(Serialize)]
pub(super) struct HealthzResponse {
    ok: bool,
}

#[derive(Serialize)]
pub(super) struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
pub(super) struct DigResponse {
    outcome: DigOutcome,
    points: u64,
    view: SessionView,
    /// Whether the terminal submission passed the cooldown gate; absent on
    /// non-terminal digs.
    submitted: Option<bool>,
    new_best: bool,
}

#[derive(Deserialize)]
pub(super) struct LeaderboardParams {
    window: Option<String>,
    limit: Option<usize>,
}

#[derive(Serialize)]
pub(super) struct LeaderboardResponse {
    window: &'static str,
    entries: Vec<ScoreRow>,
}

pub(super) enum ApiError {
    SessionComplete,
    BadWindow(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::SessionComplete => (
                StatusCode::CONFLICT,
                "session already complete; reset to play again".to_string(),
            ),
            ApiError::BadWindow(window) => (
                StatusCode::BAD_REQUEST,
                format!("unknown leaderboard window: {window}"),
            ),
            ApiError::Internal(err) => {
                tracing::error!(%err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::SessionComplete => ApiError::SessionComplete,
        }
    }
}

pub(super) async fn healthz() -> Json<HealthzResponse> {
    Json(HealthzResponse { ok: true })
}

pub(super) async fn config(
    AxumState(simulator): AxumState<Arc<Simulator>>,
) -> Json<GameConfig> {
    Json(simulator.config.game.clone())
}

pub(super) async fn table(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(player): Path<String>,
) -> Json<TableSnapshot> {
    Json(simulator.table(&player))
}

pub(super) async fn dig(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(player): Path<String>,
) -> Result<Json<DigResponse>, ApiError> {
    // Perceptual pacing only. The outcome is decided after the delay, at
    // evaluation time; a request in flight cannot be cancelled into a
    // different outcome.
    let delay_ms = simulator.config.game.dig_delay_ms;
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    let report = simulator.dig(&player)?;
    Ok(Json(DigResponse {
        outcome: report.decision.outcome,
        points: report.decision.points,
        submitted: report.submission.as_ref().map(|s| s.is_accepted()),
        new_best: report.new_best,
        view: report.view,
    }))
}

pub(super) async fn reset(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(player): Path<String>,
) -> Json<TableSnapshot> {
    Json(simulator.reset(&player))
}

pub(super) async fn leaderboard(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let window = match params.window.as_deref() {
        None => Window::AllTime,
        Some(raw) => Window::parse(raw).ok_or_else(|| ApiError::BadWindow(raw.to_string()))?,
    };
    let limit = params
        .limit
        .unwrap_or(digbust_types::LEADERBOARD_DEFAULT_LIMIT);
    let entries = simulator
        .leaderboard(window, limit)
        .map_err(ApiError::Internal)?;
    Ok(Json(LeaderboardResponse {
        window: match window {
            Window::AllTime => "alltime",
            Window::Today => "today",
        },
        entries,
    }))
}
