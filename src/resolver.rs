use std::time::Duration;

use serde_json::Value;
use tracing::info;

use crate::error::{AppError, Result};

/// Market identity, resolved once at startup and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Market {
    pub slug: String,
    pub name: String,
    /// CLOB token for the "Up" outcome.
    pub up_token_id: String,
    /// CLOB token for the "Down" outcome.
    pub down_token_id: String,
}

/// One-shot lookup: market slug → name + outcome-token ids via the Gamma API.
/// No retry — there is nothing to sample without a resolved market, so any
/// failure here is fatal to the process.
pub async fn resolve(gamma_api_url: &str, slug: &str) -> Result<Market> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let url = format!("{gamma_api_url}/events/slug/{slug}");
    let resp = client
        .get(&url)
        .header("Accept", "application/json")
        .send()
        .await?;
    if !resp.status().is_success() {
        return Err(AppError::MarketNotFound(format!(
            "Gamma API returned {} for slug {slug}",
            resp.status()
        )));
    }
    let event: Value = resp.json().await?;

    let market = parse_event(&event, slug)?;
    info!("[RESOLVE] {} → up={} down={}", market.name, market.up_token_id, market.down_token_id);
    Ok(market)
}

/// Extract the market identity from a Gamma event object.
///
/// `clobTokenIds` arrives either as a JSON string containing an array
/// (the usual Gamma encoding) or as a native array; both are accepted.
pub fn parse_event(event: &Value, slug: &str) -> Result<Market> {
    let first = event
        .get("markets")
        .and_then(|m| m.as_array())
        .and_then(|m| m.first())
        .ok_or_else(|| AppError::MarketNotFound(format!("no markets for slug {slug}")))?;

    let raw_ids = first
        .get("clobTokenIds")
        .ok_or_else(|| AppError::MarketNotFound(format!("no clobTokenIds for slug {slug}")))?;

    let token_ids: Vec<String> = match raw_ids {
        Value::String(s) => serde_json::from_str(s).unwrap_or_default(),
        Value::Array(_) => serde_json::from_value(raw_ids.clone()).unwrap_or_default(),
        _ => Vec::new(),
    };

    if token_ids.len() < 2 {
        return Err(AppError::MalformedMarket(format!(
            "expected 2 token ids for slug {slug}, got {}",
            token_ids.len()
        )));
    }

    Ok(Market {
        slug: event
            .get("slug")
            .and_then(|s| s.as_str())
            .unwrap_or(slug)
            .to_string(),
        name: event
            .get("title")
            .and_then(|t| t.as_str())
            .unwrap_or(slug)
            .to_string(),
        up_token_id: token_ids[0].clone(),
        down_token_id: token_ids[1].clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_string_encoded_token_ids() {
        let event = json!({
            "slug": "btc-updown-5m-1771880100",
            "title": "BTC Up or Down - 5m",
            "markets": [{"clobTokenIds": "[\"T_UP\",\"T_DOWN\"]"}]
        });
        let m = parse_event(&event, "btc-updown-5m-1771880100").unwrap();
        assert_eq!(m.name, "BTC Up or Down - 5m");
        assert_eq!(m.up_token_id, "T_UP");
        assert_eq!(m.down_token_id, "T_DOWN");
    }

    #[test]
    fn parses_native_array_token_ids() {
        let event = json!({
            "markets": [{"clobTokenIds": ["T_UP", "T_DOWN"]}]
        });
        let m = parse_event(&event, "some-slug").unwrap();
        assert_eq!(m.slug, "some-slug");
        assert_eq!(m.up_token_id, "T_UP");
        assert_eq!(m.down_token_id, "T_DOWN");
    }

    #[test]
    fn missing_markets_is_not_found() {
        let event = json!({"slug": "x"});
        match parse_event(&event, "x") {
            Err(AppError::MarketNotFound(_)) => {}
            other => panic!("expected MarketNotFound, got {other:?}"),
        }
    }

    #[test]
    fn missing_token_ids_is_not_found() {
        let event = json!({"markets": [{"question": "?"}]});
        match parse_event(&event, "x") {
            Err(AppError::MarketNotFound(_)) => {}
            other => panic!("expected MarketNotFound, got {other:?}"),
        }
    }

    #[test]
    fn single_token_id_is_malformed() {
        let event = json!({"markets": [{"clobTokenIds": "[\"only-one\"]"}]});
        match parse_event(&event, "x") {
            Err(AppError::MalformedMarket(_)) => {}
            other => panic!("expected MalformedMarket, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_token_id_string_is_malformed() {
        let event = json!({"markets": [{"clobTokenIds": "not json"}]});
        match parse_event(&event, "x") {
            Err(AppError::MalformedMarket(_)) => {}
            other => panic!("expected MalformedMarket, got {other:?}"),
        }
    }
}
