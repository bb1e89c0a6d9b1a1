use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::watch;
use tokio::time::interval;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::config::{RECONNECT_DELAY_MS, WS_PING_INTERVAL_SECS};
use crate::error::Result;
use crate::resolver::Market;
use crate::state::{MarketState, Side};
use crate::ws::messages::{classify_clob_frame, BookLevel, ClobFrame};

/// Maintains the persistent WebSocket connection to the CLOB market channel,
/// subscribed to the market's two outcome tokens. Decoded mid-price updates
/// are applied straight to `MarketState`.
pub struct ClobFeed {
    ws_url: String,
    market: Market,
    state: Arc<MarketState>,
    shutdown: watch::Receiver<bool>,
}

impl ClobFeed {
    pub fn new(
        ws_url: String,
        market: Market,
        state: Arc<MarketState>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            ws_url,
            market,
            state,
            shutdown,
        }
    }

    /// Reconnect loop: unbounded retries with a fixed delay, exited only by
    /// the shutdown signal.
    pub async fn run(mut self) {
        loop {
            info!("[CLOB] connecting to {}", self.ws_url);
            match self.connect_once().await {
                Ok(true) => {
                    info!("[CLOB] shutdown, closing connection");
                    return;
                }
                Ok(false) => info!("[CLOB] connection closed"),
                Err(e) => error!("[CLOB] connection error: {e}"),
            }

            warn!("[CLOB] reconnecting in {RECONNECT_DELAY_MS}ms");
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(RECONNECT_DELAY_MS)) => {}
                _ = self.shutdown.changed() => return,
            }
        }
    }

    /// One connection lifetime. Returns Ok(true) when shutdown was signalled.
    async fn connect_once(&mut self) -> Result<bool> {
        let (ws_stream, _) = connect_async(&self.ws_url).await?;
        let (mut write, mut read) = ws_stream.split();

        let sub_msg = build_subscribe_msg(&self.market);
        write.send(Message::Text(sub_msg)).await?;
        info!(
            "[CLOB] subscribed to tokens {} / {}",
            self.market.up_token_id, self.market.down_token_id
        );

        let mut ping_interval = interval(Duration::from_secs(WS_PING_INTERVAL_SECS));
        ping_interval.tick().await; // consume immediate first tick

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            apply_clob_frame(&self.market, &self.state, classify_clob_frame(&text));
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await?;
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            return Ok(false);
                        }
                        Some(Err(e)) => return Err(e.into()),
                        Some(Ok(_)) => {}
                    }
                }

                _ = ping_interval.tick() => {
                    debug!("[CLOB] ping");
                    write.send(Message::Text("PING".into())).await?;
                }

                _ = self.shutdown.changed() => {
                    return Ok(true);
                }
            }
        }
    }
}

/// Build the market-channel subscription payload for the two outcome tokens.
pub fn build_subscribe_msg(market: &Market) -> String {
    serde_json::json!({
        "assets_ids": [market.up_token_id, market.down_token_id],
        "type": "market"
    })
    .to_string()
}

/// Apply one classified frame to the live state. Frames for unknown assets,
/// frames with unparseable prices, and `Unknown` frames leave the state
/// untouched.
pub fn apply_clob_frame(market: &Market, state: &MarketState, frame: ClobFrame) {
    match frame {
        ClobFrame::PriceChangeBatch(entries) => {
            for entry in entries {
                let (Some(bid), Some(ask)) = (
                    entry.best_bid.as_ref().and_then(|v| v.as_finite()),
                    entry.best_ask.as_ref().and_then(|v| v.as_finite()),
                ) else {
                    continue;
                };
                if let Some(side) = side_for(market, entry.asset_id.as_deref()) {
                    state.set_mid(side, (bid + ask) / 2.0);
                }
            }
        }
        ClobFrame::BestBidAsk {
            asset_id,
            best_bid,
            best_ask,
        } => {
            let (Some(bid), Some(ask)) = (
                best_bid.as_ref().and_then(|v| v.as_finite()),
                best_ask.as_ref().and_then(|v| v.as_finite()),
            ) else {
                return;
            };
            if let Some(side) = side_for(market, Some(&asset_id)) {
                state.set_mid(side, (bid + ask) / 2.0);
            }
        }
        ClobFrame::BookSnapshot {
            asset_id,
            bids,
            asks,
        } => {
            let (Some(best_bid), Some(best_ask)) = (max_level_price(&bids), min_level_price(&asks))
            else {
                return;
            };
            if let Some(side) = side_for(market, Some(&asset_id)) {
                state.set_mid(side, (best_bid + best_ask) / 2.0);
            }
        }
        ClobFrame::Unknown => {}
    }
}

fn side_for(market: &Market, asset_id: Option<&str>) -> Option<Side> {
    match asset_id {
        Some(id) if id == market.up_token_id => Some(Side::Up),
        Some(id) if id == market.down_token_id => Some(Side::Down),
        _ => None,
    }
}

fn max_level_price(levels: &[BookLevel]) -> Option<f64> {
    levels
        .iter()
        .filter_map(|l| l.price.parse::<f64>().ok())
        .filter(|p| p.is_finite())
        .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |a| a.max(p))))
}

fn min_level_price(levels: &[BookLevel]) -> Option<f64> {
    levels
        .iter()
        .filter_map(|l| l.price.parse::<f64>().ok())
        .filter(|p| p.is_finite())
        .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |a| a.min(p))))
}
