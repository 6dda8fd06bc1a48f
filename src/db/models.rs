//! Database row types for the `market_meta` and `order_filled` tables.
//! Used by sqlx for typed queries; converted into domain types at the store boundary.
use chrono::{DateTime, Utc};

use crate::types::{MarketMetadataRaw, Trade, TradeSeq};

#[derive(Debug, sqlx::FromRow)]
pub struct MarketMetaRow {
    pub market_id: String,
    pub outcome_token_id: String,
    pub question: String,
    pub outcome: Option<String>,
    pub active: bool,
    pub end_date: Option<i64>,
    pub outcome_price: Option<f64>,
    pub volume: Option<f64>,
    pub inserted_at: i64,
}

#[derive(Debug, sqlx::FromRow)]
pub struct OrderFilledRow {
    pub asset_id: String,
    pub block_timestamp: i64,
    pub block_number: i64,
    pub log_index: i64,
    pub amount_usdc: i64,
    pub amount_token: i64,
}

impl MarketMetaRow {
    /// None when `inserted_at` is not a representable timestamp.
    pub fn into_raw(self) -> Option<MarketMetadataRaw> {
        let inserted_at = DateTime::<Utc>::from_timestamp(self.inserted_at, 0)?;
        Some(MarketMetadataRaw {
            market_id: self.market_id,
            outcome_token_id: self.outcome_token_id,
            question: self.question,
            outcome: self.outcome.filter(|o| !o.is_empty()),
            active: self.active,
            end_date: self.end_date.and_then(|s| DateTime::<Utc>::from_timestamp(s, 0)),
            outcome_price: self.outcome_price,
            volume: self.volume,
            inserted_at,
        })
    }
}

impl OrderFilledRow {
    /// None when `block_timestamp` is not a representable timestamp.
    pub fn into_trade(self) -> Option<Trade> {
        Some(Trade {
            timestamp: DateTime::<Utc>::from_timestamp(self.block_timestamp, 0)?,
            asset_id: self.asset_id,
            seq: TradeSeq {
                block_number: self.block_number,
                log_index: self.log_index,
            },
            amount_usdc: self.amount_usdc,
            amount_token: self.amount_token,
        })
    }
}
