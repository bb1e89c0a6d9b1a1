use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::watch;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{error, info, warn};

use crate::config::{RECONNECT_DELAY_MS, RTDS_SYMBOL, RTDS_TOPIC};
use crate::error::Result;
use crate::state::MarketState;
use crate::ws::messages::{classify_rtds_frame, RtdsFrame};

/// Maintains the RTDS (real-time data service) connection carrying Chainlink
/// index prices. Fully independent of the CLOB feed: it only ever writes
/// `reference_price`, and disconnects on one feed never affect the other.
pub struct RtdsFeed {
    ws_url: String,
    state: Arc<MarketState>,
    shutdown: watch::Receiver<bool>,
}

impl RtdsFeed {
    pub fn new(ws_url: String, state: Arc<MarketState>, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            ws_url,
            state,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        loop {
            info!("[RTDS] connecting to {}", self.ws_url);
            match self.connect_once().await {
                Ok(true) => {
                    info!("[RTDS] shutdown, closing connection");
                    return;
                }
                Ok(false) => info!("[RTDS] connection closed"),
                Err(e) => error!("[RTDS] connection error: {e}"),
            }

            warn!("[RTDS] reconnecting in {RECONNECT_DELAY_MS}ms");
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

        write.send(Message::Text(build_subscribe_msg())).await?;
        info!("[RTDS] subscribed to {RTDS_TOPIC} ({RTDS_SYMBOL})");

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if let RtdsFrame::Price { symbol, value } =
                                classify_rtds_frame(&text, RTDS_TOPIC)
                            {
                                if symbol == RTDS_SYMBOL {
                                    self.state.set_reference_price(value);
                                }
                            }
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

                _ = self.shutdown.changed() => {
                    return Ok(true);
                }
            }
        }
    }
}

/// Subscription payload: one topic, filtered to one symbol. The filter value
/// is itself JSON-encoded, per the RTDS protocol.
pub fn build_subscribe_msg() -> String {
    serde_json::json!({
        "action": "subscribe",
        "subscriptions": [
            {
                "topic": RTDS_TOPIC,
                "type": "*",
                "filters": format!("{{\"symbol\":\"{RTDS_SYMBOL}\"}}"),
            }
        ]
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_msg_carries_topic_and_symbol_filter() {
        let msg = build_subscribe_msg();
        let v: serde_json::Value = serde_json::from_str(&msg).unwrap();
        assert_eq!(v["action"], "subscribe");
        assert_eq!(v["subscriptions"][0]["topic"], RTDS_TOPIC);
        let filters: serde_json::Value =
            serde_json::from_str(v["subscriptions"][0]["filters"].as_str().unwrap()).unwrap();
        assert_eq!(filters["symbol"], RTDS_SYMBOL);
    }

    #[test]
    fn matching_price_updates_reference_only() {
        let state = MarketState::new();
        let raw = r#"{"topic":"crypto_prices_chainlink","payload":{"symbol":"btc/usd","value":67001.5}}"#;
        if let RtdsFrame::Price { symbol, value } = classify_rtds_frame(raw, RTDS_TOPIC) {
            if symbol == RTDS_SYMBOL {
                state.set_reference_price(value);
            }
        }
        let snap = state.snapshot();
        assert!((snap.reference_price - 67_001.5).abs() < 1e-9);
        assert_eq!(snap.up_odd, 0.5);
        assert_eq!(snap.down_odd, 0.5);
    }

    #[test]
    fn other_symbol_is_ignored() {
        let state = MarketState::new();
        let raw = r#"{"topic":"crypto_prices_chainlink","payload":{"symbol":"eth/usd","value":3500.0}}"#;
        if let RtdsFrame::Price { symbol, value } = classify_rtds_frame(raw, RTDS_TOPIC) {
            if symbol == RTDS_SYMBOL {
                state.set_reference_price(value);
            }
        }
        assert_eq!(state.snapshot().reference_price, 0.0);
    }
}
