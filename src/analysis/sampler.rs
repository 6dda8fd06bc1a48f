use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::types::{CanonicalMarket, EntrySample, Trade, TradeSeq};

/// One fill on an asset's timeline. `price` is None for unusable fills.
#[derive(Debug, Clone)]
struct TimelinePoint {
    timestamp: DateTime<Utc>,
    seq: TradeSeq,
    price: Option<f64>,
}

/// Per-asset trade timelines sorted by `(timestamp, seq)`, built once per run.
/// Answers as-of lookups with a binary search for the right boundary.
#[derive(Debug, Default)]
pub struct TradeTimeline {
    by_asset: HashMap<String, Vec<TimelinePoint>>,
    invalid_trades: usize,
}

impl TradeTimeline {
    pub fn build(trades: Vec<Trade>) -> Self {
        let mut by_asset: HashMap<String, Vec<TimelinePoint>> = HashMap::new();
        let mut invalid_trades = 0;
        for trade in trades {
            let price = trade.price();
            if price.is_none() {
                invalid_trades += 1;
            }
            by_asset.entry(trade.asset_id).or_default().push(TimelinePoint {
                timestamp: trade.timestamp,
                seq: trade.seq,
                price,
            });
        }
        for points in by_asset.values_mut() {
            // Stable: fills with identical (timestamp, seq) keep input order.
            points.sort_by(|a, b| (a.timestamp, a.seq).cmp(&(b.timestamp, b.seq)));
        }
        Self { by_asset, invalid_trades }
    }

    /// Fills skipped because their token amount was zero or negative.
    pub fn invalid_trades(&self) -> usize {
        self.invalid_trades
    }

    pub fn asset_count(&self) -> usize {
        self.by_asset.len()
    }

    /// Last usable fill of `asset_id` with `timestamp <= cutoff`.
    /// Among fills sharing the greatest timestamp the highest `seq` wins.
    pub fn price_at_or_before(
        &self,
        asset_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Option<(DateTime<Utc>, f64)> {
        let points = self.by_asset.get(asset_id)?;
        let end = points.partition_point(|p| p.timestamp <= cutoff);
        points[..end]
            .iter()
            .rev()
            .find_map(|p| p.price.map(|price| (p.timestamp, price)))
    }

    /// Entry sample for `market`: last traded price at `resolution - minutes_before`.
    pub fn sample(&self, market: &CanonicalMarket, minutes_before: u32) -> Option<EntrySample> {
        let cutoff = entry_cutoff(market.resolution_time, minutes_before);
        self.price_at_or_before(&market.asset_id, cutoff)
            .map(|(entry_timestamp, entry_price)| EntrySample {
                market_id: market.market_id.clone(),
                entry_timestamp,
                entry_price,
            })
    }
}

pub fn entry_cutoff(resolution_time: DateTime<Utc>, minutes_before: u32) -> DateTime<Utc> {
    resolution_time - Duration::minutes(i64::from(minutes_before))
}
