use crate::error::{AppError, Result};

pub const CLOB_WS_URL: &str = "wss://ws-subscriptions-clob.polymarket.com/ws/market";
pub const RTDS_WS_URL: &str = "wss://ws-live-data.polymarket.com";
pub const GAMMA_API_URL: &str = "https://gamma-api.polymarket.com";

/// Keep-alive interval on the CLOB socket (seconds). The server answers the
/// literal "PING" text frame with "PONG".
pub const WS_PING_INTERVAL_SECS: u64 = 10;

/// Fixed delay before a dropped feed connection is retried. Retries are
/// unbounded; only the shutdown signal stops a reconnect loop.
pub const RECONNECT_DELAY_MS: u64 = 5_000;

/// Sliding-history capacity: one entry per successful sample, so 5 entries
/// covers the 1s..5s lookback features.
pub const HISTORY_CAPACITY: usize = 5;

/// Width of the window bucket samples are attributed to (5 minutes).
/// Fixed per process — the worker tracks one market cadence.
pub const WINDOW_BUCKET_MS: i64 = 300_000;

/// RTDS subscription topic and the symbol filter applied to it.
pub const RTDS_TOPIC: &str = "crypto_prices_chainlink";
pub const RTDS_SYMBOL: &str = "btc/usd";

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string (DATABASE_URL). Required.
    pub database_url: String,
    /// Slug of the market to sample (MARKET_SLUG).
    pub market_slug: String,
    pub gamma_api_url: String,
    pub clob_ws_url: String,
    pub rtds_ws_url: String,
    /// Sampler tick period in milliseconds (SAMPLE_INTERVAL_MS).
    pub sample_interval_ms: u64,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let sample_interval_ms = std::env::var("SAMPLE_INTERVAL_MS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse::<u64>()
            .ok()
            .filter(|ms| *ms > 0)
            .ok_or_else(|| {
                AppError::Config("SAMPLE_INTERVAL_MS must be a positive integer".to_string())
            })?;

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| AppError::Config("DATABASE_URL must be set".to_string()))?,
            market_slug: std::env::var("MARKET_SLUG")
                .unwrap_or_else(|_| "btc-updown-5m-1771880100".to_string()),
            gamma_api_url: std::env::var("GAMMA_API_URL")
                .unwrap_or_else(|_| GAMMA_API_URL.to_string()),
            clob_ws_url: std::env::var("CLOB_WS_URL")
                .unwrap_or_else(|_| CLOB_WS_URL.to_string()),
            rtds_ws_url: std::env::var("RTDS_WS_URL")
                .unwrap_or_else(|_| RTDS_WS_URL.to_string()),
            sample_interval_ms,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sample_interval_is_a_config_error() {
        std::env::set_var("DATABASE_URL", "postgres://localhost/odds");
        std::env::set_var("SAMPLE_INTERVAL_MS", "0");
        match Config::from_env() {
            Err(AppError::Config(msg)) => assert!(msg.contains("SAMPLE_INTERVAL_MS")),
            other => panic!("expected Config error, got {other:?}"),
        }
        std::env::remove_var("SAMPLE_INTERVAL_MS");
        std::env::remove_var("DATABASE_URL");
    }
}
