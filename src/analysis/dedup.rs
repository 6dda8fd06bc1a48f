use std::collections::BTreeMap;

use crate::types::{CanonicalMarket, MarketMetadataRaw};

/// Canonical markets plus the counts of markets dropped during selection.
#[derive(Debug, Default)]
pub struct Deduplicated {
    /// One entry per market id, ordered by market id.
    pub markets: Vec<CanonicalMarket>,
    /// Selected record carries no settlement value yet.
    pub unresolved: usize,
    /// Selected record has a settlement value but no resolution time.
    pub missing_end_date: usize,
}

/// Collapses metadata snapshots to one record per market.
///
/// The record with the latest `inserted_at` wins; equal timestamps fall back to the
/// smallest `outcome_token_id`, so the selection does not depend on input order.
/// Markets whose selected record is unresolved are dropped and counted.
pub fn deduplicate(rows: &[MarketMetadataRaw]) -> Deduplicated {
    let mut latest: BTreeMap<&str, &MarketMetadataRaw> = BTreeMap::new();
    for row in rows {
        latest
            .entry(row.market_id.as_str())
            .and_modify(|current| {
                if supersedes(row, *current) {
                    *current = row;
                }
            })
            .or_insert(row);
    }

    let mut out = Deduplicated::default();
    for row in latest.into_values() {
        let Some(outcome_price) = row.outcome_price.filter(|p| p.is_finite()) else {
            out.unresolved += 1;
            continue;
        };
        let Some(resolution_time) = row.end_date else {
            out.missing_end_date += 1;
            continue;
        };
        out.markets.push(CanonicalMarket {
            market_id: row.market_id.clone(),
            asset_id: row.outcome_token_id.clone(),
            question: row.question.clone(),
            outcome: row.outcome.clone(),
            active: row.active,
            resolution_time,
            outcome_price,
            volume: row.volume,
            inserted_at: row.inserted_at,
        });
    }
    out
}

fn supersedes(candidate: &MarketMetadataRaw, current: &MarketMetadataRaw) -> bool {
    candidate.inserted_at > current.inserted_at
        || (candidate.inserted_at == current.inserted_at
            && candidate.outcome_token_id < current.outcome_token_id)
}
