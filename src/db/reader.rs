use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::db::models::{MarketMetaRow, OrderFilledRow};
use crate::error::Result;
use crate::types::{MarketMetadataRaw, Trade};

/// Read-only access to ingested market metadata and order fills.
/// Every query returns the complete row set or fails; there is no partial read.
#[derive(Clone)]
pub struct MarketDataStore {
    pool: SqlitePool,
}

impl MarketDataStore {
    pub async fn connect(cfg: &StoreConfig) -> Result<Self> {
        let timeout = Duration::from_secs(cfg.busy_timeout_secs);
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", cfg.db_path))?
            .create_if_missing(true)
            .busy_timeout(timeout);
        let pool = SqlitePoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(timeout)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    #[cfg(test)]
    pub(crate) fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// All metadata rows of every market with at least one row whose end date
    /// falls in `[since, until]`. Rows of such a market outside the window are
    /// included so deduplication sees every snapshot of the market.
    pub async fn fetch_metadata(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<MarketMetadataRaw>> {
        let rows: Vec<MarketMetaRow> = sqlx::query_as(
            r#"
            SELECT market_id, outcome_token_id, question, outcome, active,
                   end_date, outcome_price, volume, inserted_at
            FROM market_meta
            WHERE market_id IN (
                SELECT DISTINCT market_id FROM market_meta
                WHERE end_date IS NOT NULL AND end_date >= ? AND end_date <= ?
            )
            ORDER BY market_id, inserted_at
            "#,
        )
        .bind(since.timestamp())
        .bind(until.timestamp())
        .fetch_all(&self.pool)
        .await?;

        let total = rows.len();
        let metadata: Vec<MarketMetadataRaw> =
            rows.into_iter().filter_map(MarketMetaRow::into_raw).collect();
        if metadata.len() < total {
            warn!(
                dropped = total - metadata.len(),
                "[STORE] metadata rows with unrepresentable inserted_at dropped"
            );
        }
        debug!(rows = metadata.len(), "[STORE] metadata fetched");
        Ok(metadata)
    }

    /// Full fill history up to `until` for every outcome token of a market whose
    /// end date falls in `[since, until]`, ordered by asset then chain order.
    pub async fn fetch_trades(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Trade>> {
        let rows: Vec<OrderFilledRow> = sqlx::query_as(
            r#"
            SELECT f.asset_id, f.block_timestamp, f.block_number, f.log_index,
                   f.amount_usdc, f.amount_token
            FROM order_filled f
            WHERE f.block_timestamp <= ?
              AND f.asset_id IN (
                  SELECT DISTINCT outcome_token_id FROM market_meta
                  WHERE end_date IS NOT NULL AND end_date >= ? AND end_date <= ?
              )
            ORDER BY f.asset_id, f.block_timestamp, f.block_number, f.log_index
            "#,
        )
        .bind(until.timestamp())
        .bind(since.timestamp())
        .bind(until.timestamp())
        .fetch_all(&self.pool)
        .await?;

        let total = rows.len();
        let trades: Vec<Trade> = rows.into_iter().filter_map(OrderFilledRow::into_trade).collect();
        if trades.len() < total {
            warn!(
                dropped = total - trades.len(),
                "[STORE] fills with unrepresentable block_timestamp dropped"
            );
        }
        debug!(rows = trades.len(), "[STORE] trades fetched");
        Ok(trades)
    }
}
