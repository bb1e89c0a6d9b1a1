use sqlx::PgPool;

use crate::db::models::OddsRow;
use crate::error::Result;

/// Appends sample rows to Postgres. Each row is one independent INSERT — no
/// batching, no cross-row transactions; the caller decides what to do with a
/// failure (the sampler skips its history update for that tick).
pub struct OddsWriter {
    pool: PgPool,
}

impl OddsWriter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn append(&self, row: &OddsRow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO odds_samples (
                market_id, market_name, window_ts, sample_ts, reference_price,
                up_odd, down_odd,
                up_pct_chg_1s, up_pct_chg_2s, up_pct_chg_3s, up_pct_chg_4s, up_pct_chg_5s,
                down_pct_chg_1s, down_pct_chg_2s, down_pct_chg_3s, down_pct_chg_4s, down_pct_chg_5s
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(&row.market_id)
        .bind(&row.market_name)
        .bind(row.window_ts)
        .bind(row.sample_ts)
        .bind(row.reference_price)
        .bind(row.up_odd)
        .bind(row.down_odd)
        .bind(row.up_pct_chg_1s)
        .bind(row.up_pct_chg_2s)
        .bind(row.up_pct_chg_3s)
        .bind(row.up_pct_chg_4s)
        .bind(row.up_pct_chg_5s)
        .bind(row.down_pct_chg_1s)
        .bind(row.down_pct_chg_2s)
        .bind(row.down_pct_chg_3s)
        .bind(row.down_pct_chg_4s)
        .bind(row.down_pct_chg_5s)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
