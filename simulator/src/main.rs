use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use digbust_simulator::{Api, ScoreStore, Simulator, SimulatorConfig};
use digbust_types::GameConfig;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "digbust-simulator", about = "Local backend for digbust")]
struct Args {
    /// Address to bind the HTTP API on.
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Path to the sqlite score database. Omit for an in-memory store that
    /// vanishes on shutdown.
    #[arg(long)]
    db: Option<PathBuf>,

    /// Seed for the deterministic dig RNG streams. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Pacing delay between a dig request and its evaluation.
    #[arg(long)]
    dig_delay_ms: Option<u64>,

    /// Minimum interval between accepted score submissions.
    #[arg(long)]
    submit_cooldown_ms: Option<u64>,

    /// Per-IP dig request limit. Both values must be set to enable it.
    #[arg(long)]
    dig_rate_per_sec: Option<u64>,
    #[arg(long)]
    dig_rate_burst: Option<u32>,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();
}

fn build_config(args: &Args) -> Result<SimulatorConfig> {
    let mut game = GameConfig::default();
    if let Some(delay) = args.dig_delay_ms {
        game.dig_delay_ms = delay;
    }
    if let Some(cooldown) = args.submit_cooldown_ms {
        game.submit_cooldown_ms = cooldown;
    }
    game.validate().context("invalid game configuration")?;

    Ok(SimulatorConfig {
        game,
        seed: args.seed.unwrap_or_else(rand::random),
        dig_rate_limit_per_second: args.dig_rate_per_sec,
        dig_rate_limit_burst: args.dig_rate_burst,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = build_config(&args)?;

    let store = match &args.db {
        Some(path) => ScoreStore::open(path)
            .with_context(|| format!("open score db at {}", path.display()))?,
        None => {
            info!("no --db given; scores are kept in memory only");
            ScoreStore::open_in_memory()?
        }
    };

    let simulator = Arc::new(Simulator::new(config, Arc::new(store))?);
    let router = Api::new(simulator.clone()).router();

    let addr = SocketAddr::new(args.host, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(%addr, seed = simulator.config.seed, "digbust simulator listening");
    axum::serve(listener, router).await.context("serve http")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_game_overrides() {
        let args = Args::parse_from([
            "simulator",
            "--seed",
            "7",
            "--dig-delay-ms",
            "0",
            "--submit-cooldown-ms",
            "100",
        ]);
        let config = build_config(&args).expect("config should parse");
        assert_eq!(config.seed, 7);
        assert_eq!(config.game.dig_delay_ms, 0);
        assert_eq!(config.game.submit_cooldown_ms, 100);
    }

    #[test]
    fn defaults_leave_balancing_untouched() {
        let args = Args::parse_from(["simulator"]);
        let config = build_config(&args).expect("config should parse");
        assert_eq!(config.game.jackpot_bonus, GameConfig::default().jackpot_bonus);
        assert!(config.dig_rate_limit_per_second.is_none());
    }
}
