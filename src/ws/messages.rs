use serde::Deserialize;

/// A numeric field the venue encodes as either a JSON number or a string.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum NumOrStr {
    Num(f64),
    Str(String),
}

impl NumOrStr {
    /// Parse to a finite f64, or None.
    pub fn as_finite(&self) -> Option<f64> {
        let v = match self {
            NumOrStr::Num(n) => *n,
            NumOrStr::Str(s) => s.parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }
}

/// One entry inside a `price_change` batch.
#[derive(Debug, Deserialize, Clone)]
pub struct PriceChangeEntry {
    #[serde(default)]
    pub asset_id: Option<String>,
    #[serde(default)]
    pub best_bid: Option<NumOrStr>,
    #[serde(default)]
    pub best_ask: Option<NumOrStr>,
}

/// A single price level in a `book` snapshot.
#[derive(Debug, Deserialize, Clone)]
pub struct BookLevel {
    pub price: String,
    #[allow(dead_code)]
    pub size: String,
}

/// Raw deserializable shape covering all market-channel messages. Fields are
/// optional because the three event types carry different subsets.
#[derive(Debug, Deserialize)]
struct RawClobMsg {
    event_type: Option<String>,
    asset_id: Option<String>,
    best_bid: Option<NumOrStr>,
    best_ask: Option<NumOrStr>,
    price_changes: Option<Vec<PriceChangeEntry>>,
    bids: Option<Vec<BookLevel>>,
    asks: Option<Vec<BookLevel>>,
}

/// Closed classification of a CLOB market-channel frame. A frame matches
/// exactly one variant; anything unrecognized — including the literal "PONG"
/// keep-alive reply and unparseable payloads — is `Unknown` and ignored.
#[derive(Debug)]
pub enum ClobFrame {
    PriceChangeBatch(Vec<PriceChangeEntry>),
    BestBidAsk {
        asset_id: String,
        best_bid: Option<NumOrStr>,
        best_ask: Option<NumOrStr>,
    },
    BookSnapshot {
        asset_id: String,
        bids: Vec<BookLevel>,
        asks: Vec<BookLevel>,
    },
    Unknown,
}

/// Classify one raw text frame from the CLOB socket.
pub fn classify_clob_frame(raw: &str) -> ClobFrame {
    if raw == "PONG" {
        return ClobFrame::Unknown;
    }
    let msg: RawClobMsg = match serde_json::from_str(raw) {
        Ok(m) => m,
        Err(_) => return ClobFrame::Unknown,
    };

    match msg.event_type.as_deref() {
        Some("price_change") => match msg.price_changes {
            Some(entries) if !entries.is_empty() => ClobFrame::PriceChangeBatch(entries),
            _ => ClobFrame::Unknown,
        },
        Some("best_bid_ask") => match msg.asset_id {
            Some(asset_id) => ClobFrame::BestBidAsk {
                asset_id,
                best_bid: msg.best_bid,
                best_ask: msg.best_ask,
            },
            None => ClobFrame::Unknown,
        },
        Some("book") => match msg.asset_id {
            Some(asset_id) => ClobFrame::BookSnapshot {
                asset_id,
                bids: msg.bids.unwrap_or_default(),
                asks: msg.asks.unwrap_or_default(),
            },
            None => ClobFrame::Unknown,
        },
        _ => ClobFrame::Unknown,
    }
}

// ---------------------------------------------------------------------------
// RTDS (reference price) frames
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RtdsPayload {
    symbol: Option<String>,
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawRtdsMsg {
    topic: Option<String>,
    payload: Option<RtdsPayload>,
}

/// Classification of an RTDS frame: either a price update for some symbol on
/// the crypto-prices topic, or noise.
#[derive(Debug)]
pub enum RtdsFrame {
    Price { symbol: String, value: f64 },
    Unknown,
}

/// Classify one raw text frame from the RTDS socket against the given topic.
pub fn classify_rtds_frame(raw: &str, topic: &str) -> RtdsFrame {
    let msg: RawRtdsMsg = match serde_json::from_str(raw) {
        Ok(m) => m,
        Err(_) => return RtdsFrame::Unknown,
    };
    if msg.topic.as_deref() != Some(topic) {
        return RtdsFrame::Unknown;
    }
    match msg.payload {
        Some(RtdsPayload {
            symbol: Some(symbol),
            value: Some(value),
        }) if value.is_finite() => RtdsFrame::Price { symbol, value },
        _ => RtdsFrame::Unknown,
    }
}
