//! Test helpers: an in-memory store migrated with the crate schema, plus row builders.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::db::MarketDataStore;
use crate::types::{CanonicalMarket, MarketMetadataRaw, Trade, TradeSeq};

pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

/// Single-connection pool so every query sees the same in-memory database.
pub async fn memory_store() -> MarketDataStore {
    let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(options)
        .await
        .unwrap();
    let store = MarketDataStore::from_pool(pool);
    store.migrate().await.unwrap();
    store
}

#[derive(Debug, Clone)]
pub struct MetaFixture {
    pub market_id: String,
    pub token: String,
    pub question: String,
    pub outcome: Option<String>,
    pub active: bool,
    pub end_date: Option<i64>,
    pub outcome_price: Option<f64>,
    pub volume: Option<f64>,
    pub inserted_at: i64,
}

impl MetaFixture {
    pub fn resolved(market_id: &str, token: &str, end_date: i64, outcome_price: f64) -> Self {
        Self {
            market_id: market_id.to_string(),
            token: token.to_string(),
            question: format!("Will {market_id} happen?"),
            outcome: Some("Yes".to_string()),
            active: true,
            end_date: Some(end_date),
            outcome_price: Some(outcome_price),
            volume: Some(10_000.0),
            inserted_at: 0,
        }
    }

    pub fn end_date(mut self, end_date: Option<i64>) -> Self {
        self.end_date = end_date;
        self
    }

    pub fn outcome_price(mut self, outcome_price: Option<f64>) -> Self {
        self.outcome_price = outcome_price;
        self
    }

    pub fn inserted(mut self, inserted_at: i64) -> Self {
        self.inserted_at = inserted_at;
        self
    }

    pub fn raw(&self) -> MarketMetadataRaw {
        MarketMetadataRaw {
            market_id: self.market_id.clone(),
            outcome_token_id: self.token.clone(),
            question: self.question.clone(),
            outcome: self.outcome.clone(),
            active: self.active,
            end_date: self.end_date.map(at),
            outcome_price: self.outcome_price,
            volume: self.volume,
            inserted_at: at(self.inserted_at),
        }
    }
}

/// Metadata row that deduplicates back to `m`.
pub fn raw_from_canonical(m: &CanonicalMarket) -> MarketMetadataRaw {
    MarketMetadataRaw {
        market_id: m.market_id.clone(),
        outcome_token_id: m.asset_id.clone(),
        question: m.question.clone(),
        outcome: m.outcome.clone(),
        active: m.active,
        end_date: Some(m.resolution_time),
        outcome_price: Some(m.outcome_price),
        volume: m.volume,
        inserted_at: m.inserted_at,
    }
}

pub async fn insert_meta(store: &MarketDataStore, m: MetaFixture) {
    sqlx::query(
        r#"
        INSERT INTO market_meta (
            market_id, outcome_token_id, question, outcome, active,
            end_date, outcome_price, volume, inserted_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&m.market_id)
    .bind(&m.token)
    .bind(&m.question)
    .bind(&m.outcome)
    .bind(m.active)
    .bind(m.end_date)
    .bind(m.outcome_price)
    .bind(m.volume)
    .bind(m.inserted_at)
    .execute(store.pool())
    .await
    .unwrap();
}

pub async fn insert_fill(
    store: &MarketDataStore,
    asset_id: &str,
    block_timestamp: i64,
    block_number: i64,
    log_index: i64,
    amount_usdc: i64,
    amount_token: i64,
) {
    sqlx::query(
        r#"
        INSERT INTO order_filled (
            asset_id, block_timestamp, block_number, log_index, amount_usdc, amount_token
        ) VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(asset_id)
    .bind(block_timestamp)
    .bind(block_number)
    .bind(log_index)
    .bind(amount_usdc)
    .bind(amount_token)
    .execute(store.pool())
    .await
    .unwrap();
}

/// A fill priced at `price` for one token.
pub fn trade(asset_id: &str, secs: i64, block_number: i64, log_index: i64, price: f64) -> Trade {
    Trade {
        asset_id: asset_id.to_string(),
        timestamp: at(secs),
        seq: TradeSeq { block_number, log_index },
        amount_usdc: (price * 1_000_000.0).round() as i64,
        amount_token: 1_000_000,
    }
}
