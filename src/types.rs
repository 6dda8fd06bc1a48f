use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Trades
// ---------------------------------------------------------------------------

/// On-chain ordering of a fill. Breaks ties between fills sharing a block timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TradeSeq {
    pub block_number: i64,
    pub log_index: i64,
}

/// One order fill for an outcome token. Amounts are raw integers with 6 decimals
/// (1 USDC = 1_000_000); both sides share the scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub asset_id: String,
    pub timestamp: DateTime<Utc>,
    pub seq: TradeSeq,
    pub amount_usdc: i64,
    pub amount_token: i64,
}

impl Trade {
    /// USDC paid per outcome token. None when the token amount is zero or negative,
    /// which makes the fill unusable as a price observation.
    /// The shared 6-decimal scale cancels, so the ratio is one rounded division.
    pub fn price(&self) -> Option<f64> {
        if self.amount_token <= 0 {
            return None;
        }
        Some(self.amount_usdc as f64 / self.amount_token as f64)
    }
}

// ---------------------------------------------------------------------------
// Market metadata
// ---------------------------------------------------------------------------

/// One ingested metadata row for a `(market_id, outcome_token_id)` pair.
/// The same pair may appear once per ingestion snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketMetadataRaw {
    pub market_id: String,
    pub outcome_token_id: String,
    pub question: String,
    /// Outcome label of the token, e.g. "Yes" / "No".
    pub outcome: Option<String>,
    pub active: bool,
    /// Resolution time.
    pub end_date: Option<DateTime<Utc>>,
    /// Settlement value; only present once the market has resolved.
    pub outcome_price: Option<f64>,
    pub volume: Option<f64>,
    pub inserted_at: DateTime<Utc>,
}

/// The authoritative record of a resolved market after deduplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalMarket {
    pub market_id: String,
    /// Outcome token of the selected record. Trades are sampled for this asset.
    pub asset_id: String,
    pub question: String,
    pub outcome: Option<String>,
    pub active: bool,
    pub resolution_time: DateTime<Utc>,
    pub outcome_price: f64,
    pub volume: Option<f64>,
    pub inserted_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Backtest observations
// ---------------------------------------------------------------------------

/// Last traded price at or before the entry cutoff of a market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySample {
    pub market_id: String,
    pub entry_timestamp: DateTime<Utc>,
    pub entry_price: f64,
}

/// A simulated strategy entry: an entry sample inside the accepted price range,
/// labelled against the market's settlement value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualifyingTrade {
    pub market_id: String,
    pub asset_id: String,
    pub question: String,
    pub outcome: Option<String>,
    pub resolution_time: DateTime<Utc>,
    pub entry_timestamp: DateTime<Utc>,
    pub entry_price: f64,
    pub outcome_price: f64,
    /// Last traded price at or before resolution, for comparison with the settlement.
    pub final_price: Option<f64>,
    pub win: bool,
}
