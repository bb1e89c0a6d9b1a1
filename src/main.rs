mod config;
mod db;
mod error;
mod resolver;
mod sampler;
mod state;
mod ws;

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::db::OddsWriter;
use crate::error::Result;
use crate::sampler::Sampler;
use crate::state::MarketState;
use crate::ws::{ClobFeed, RtdsFeed};

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Database setup ---
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&cfg.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database ready");

    // --- One-shot market resolution: any failure here is fatal ---
    let market = resolver::resolve(&cfg.gamma_api_url, &cfg.market_slug).await?;

    // --- Shared state, created only after a market exists ---
    let state = MarketState::new();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // --- Spawn the three long-lived activities ---
    let clob = ClobFeed::new(
        cfg.clob_ws_url.clone(),
        market.clone(),
        Arc::clone(&state),
        shutdown_rx.clone(),
    );
    let clob_handle = tokio::spawn(async move { clob.run().await });

    let rtds = RtdsFeed::new(cfg.rtds_ws_url.clone(), Arc::clone(&state), shutdown_rx.clone());
    let rtds_handle = tokio::spawn(async move { rtds.run().await });

    let writer = Arc::new(OddsWriter::new(pool.clone()));
    let sampler = Sampler::new(
        market,
        Arc::clone(&state),
        writer,
        Duration::from_millis(cfg.sample_interval_ms),
        shutdown_rx,
    );
    let sampler_handle = tokio::spawn(async move { sampler.run().await });

    info!(
        "Ingestion started ({}ms sample period). Ctrl+C to stop.",
        cfg.sample_interval_ms
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    // Ordered teardown: timer first — the sampler stops ticking and drains
    // its in-flight writes before returning — then the two sockets (dropping
    // their reconnect loops), then the pool, so no write is attempted after
    // the sink is gone.
    let _ = shutdown_tx.send(true);
    let _ = sampler_handle.await;
    let _ = clob_handle.await;
    let _ = rtds_handle.await;

    pool.close().await;
    info!("Clean shutdown");
    Ok(())
}
