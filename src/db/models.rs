use chrono::{DateTime, Utc};

/// One appended sample row. Column names and nullability are the durable
/// contract downstream consumers read, so they match the table exactly:
/// the ten pct-change columns are nullable, everything else is not.
#[derive(Debug, Clone)]
pub struct OddsRow {
    pub market_id: String,
    pub market_name: String,
    /// `sample_ts` floored to the window bucket boundary.
    pub window_ts: DateTime<Utc>,
    pub sample_ts: DateTime<Utc>,
    pub reference_price: f64,
    pub up_odd: f64,
    pub down_odd: f64,
    pub up_pct_chg_1s: Option<f64>,
    pub up_pct_chg_2s: Option<f64>,
    pub up_pct_chg_3s: Option<f64>,
    pub up_pct_chg_4s: Option<f64>,
    pub up_pct_chg_5s: Option<f64>,
    pub down_pct_chg_1s: Option<f64>,
    pub down_pct_chg_2s: Option<f64>,
    pub down_pct_chg_3s: Option<f64>,
    pub down_pct_chg_4s: Option<f64>,
    pub down_pct_chg_5s: Option<f64>,
}
