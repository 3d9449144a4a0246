use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use governor::middleware::NoOpMiddleware;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::Simulator;

mod http;

pub struct Api {
    simulator: Arc<Simulator>,
}

type IpGovernorConfig =
    tower_governor::governor::GovernorConfig<SmartIpKeyExtractor, NoOpMiddleware>;

fn default_governor_config() -> Option<IpGovernorConfig> {
    GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .finish()
}

impl Api {
    pub fn new(simulator: Arc<Simulator>) -> Self {
        Self { simulator }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(AllowOrigin::any())
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]);

        // Dig-specific rate limiting (per IP, per second). The submission
        // cooldown is enforced by the game's own gate; this layer only keeps
        // a misbehaving client from hammering the endpoint.
        let dig_governor_conf = match (
            self.simulator.config.dig_rate_limit_per_second,
            self.simulator.config.dig_rate_limit_burst,
        ) {
            (Some(rate_per_second), Some(burst_size)) if rate_per_second > 0 && burst_size > 0 => {
                let nanos_per_request = (1_000_000_000u64 / rate_per_second).max(1);
                let period = Duration::from_nanos(nanos_per_request);
                tracing::info!(
                    rate_per_second,
                    burst_size,
                    "dig endpoint rate limit configured"
                );
                let config = GovernorConfigBuilder::default()
                    .period(period)
                    .burst_size(burst_size)
                    .key_extractor(SmartIpKeyExtractor)
                    .finish()
                    .or_else(|| {
                        tracing::warn!("invalid rate-limit config; falling back to defaults");
                        default_governor_config()
                    });
                config.map(Arc::new)
            }
            _ => None,
        };

        let dig_route = match dig_governor_conf {
            Some(config) => Router::new()
                .route("/table/:player/dig", post(http::dig))
                .layer(GovernorLayer { config }),
            None => Router::new().route("/table/:player/dig", post(http::dig)),
        };

        Router::new()
            .route("/healthz", get(http::healthz))
            .route("/config", get(http::config))
            .route("/table/:player", get(http::table))
            .route("/table/:player/reset", post(http::reset))
            .route("/leaderboard", get(http::leaderboard))
            .merge(dig_route)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.simulator.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ScoreStore, SimulatorConfig};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use digbust_types::GameConfig;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_router(game: GameConfig) -> Router {
        let store = Arc::new(ScoreStore::open_in_memory().unwrap());
        let config = SimulatorConfig {
            game,
            seed: 11,
            ..SimulatorConfig::default()
        };
        let simulator = Arc::new(Simulator::new(config, store).unwrap());
        Api::new(simulator).router()
    }

    fn instant_game() -> GameConfig {
        GameConfig {
            dig_delay_ms: 0,
            ..GameConfig::default()
        }
    }

    async fn json_response(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn post(uri: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_healthz() {
        let router = test_router(instant_game());
        let (status, body) = json_response(&router, get_req("/healthz")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_config_served() {
        let router = test_router(instant_game());
        let (status, body) = json_response(&router, get_req("/config")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["jackpot_bonus"], 500);
        assert_eq!(body["jackpot_threshold"], 30);
    }

    #[tokio::test]
    async fn test_fresh_table_view() {
        let router = test_router(instant_game());
        let (status, body) = json_response(&router, get_req("/table/alice")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"]["digs"], 0);
        assert_eq!(body["view"]["status"], "playing");
        assert_eq!(body["view"]["message"], "KEEP DIGGING!");
        assert_eq!(body["best_score"], 0);
    }

    #[tokio::test]
    async fn test_dig_advances_session() {
        let router = test_router(instant_game());
        let (status, body) = json_response(&router, post("/table/alice/dig")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"]["digs"], 1);
        assert!(body["outcome"].is_string());
    }

    #[tokio::test]
    async fn test_dig_after_terminal_conflicts() {
        // Guaranteed bust on the first dig.
        let game = GameConfig {
            dig_delay_ms: 0,
            bust_base_chance: 1.0,
            jackpot_base_chance: 0.0,
            jackpot_max_chance: 0.0,
            ..GameConfig::default()
        };
        let router = test_router(game);
        let (status, body) = json_response(&router, post("/table/alice/dig")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"]["status"], "busted");
        assert_eq!(body["outcome"], "bust");
        assert_eq!(body["submitted"], true);

        let (status, body) = json_response(&router, post("/table/alice/dig")).await;
        assert_eq!(status, StatusCode::CONFLICT, "body: {body}");

        // Reset brings the table back.
        let (status, body) = json_response(&router, post("/table/alice/reset")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"]["status"], "playing");
        assert_eq!(body["total_attempts"], 1);
    }

    #[tokio::test]
    async fn test_guaranteed_jackpot_flow_and_leaderboard() {
        let game = GameConfig {
            dig_delay_ms: 0,
            bust_base_chance: 0.0,
            bust_increment: 0.0,
            gem_chance: 0.0,
            jackpot_threshold: 0,
            jackpot_base_chance: 1.0,
            jackpot_max_chance: 1.0,
            ..GameConfig::default()
        };
        let router = test_router(game);
        let (status, body) = json_response(&router, post("/table/alice/dig")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "jackpot");
        assert_eq!(body["points"], 500);
        assert_eq!(body["view"]["score"], 500);
        assert_eq!(body["view"]["status"], "jackpot");
        assert_eq!(body["new_best"], true);

        // The submission is queued to a worker thread; poll briefly.
        for _ in 0..50 {
            let (_, board) = json_response(&router, get_req("/leaderboard")).await;
            if board["entries"].as_array().is_some_and(|rows| !rows.is_empty()) {
                assert_eq!(board["entries"][0]["score"], 500);
                assert_eq!(board["entries"][0]["outcome"], "jackpot");
                assert_eq!(board["entries"][0]["rank"], 1);
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("submitted score never appeared on the leaderboard");
    }

    #[tokio::test]
    async fn test_leaderboard_rejects_unknown_window() {
        let router = test_router(instant_game());
        let (status, _) = json_response(&router, get_req("/leaderboard?window=weekly")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_leaderboard_accepts_absurd_limit() {
        let router = test_router(instant_game());
        let (status, body) =
            json_response(&router, get_req("/leaderboard?limit=18446744073709551615")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["entries"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_leaderboard_empty_ok() {
        let router = test_router(instant_game());
        let (status, body) = json_response(&router, get_req("/leaderboard?window=today&limit=5")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["window"], "today");
        assert_eq!(body["entries"], serde_json::json!([]));
    }
}
