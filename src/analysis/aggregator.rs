use std::collections::BTreeMap;

use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};

use crate::types::QualifyingTrade;

/// Entry prices are bucketed in basis points.
const BPS_PER_UNIT: f64 = 10_000.0;

/// Histogram ceiling (2.0 in price terms). Noisy fills above it are clamped.
const MAX_PRICE_BPS: u64 = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateStatus {
    Ok,
    /// No qualifying trades. Ratios are reported as 0 and carry no information.
    NoData,
}

impl std::fmt::Display for AggregateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateStatus::Ok => write!(f, "ok"),
            AggregateStatus::NoData => write!(f, "no_data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub total_markets: usize,
    pub qualifying_count: usize,
    pub win_count: usize,
    pub loss_count: usize,
    pub win_rate: f64,
    pub avg_entry_price: f64,
    /// Expected profit per $1 wagered at `avg_entry_price` with a $1 / $0 binary payout.
    pub expected_value: f64,
    pub status: AggregateStatus,
}

impl AggregateResult {
    pub fn has_data(&self) -> bool {
        self.status == AggregateStatus::Ok
    }
}

pub fn expected_value(win_rate: f64, avg_entry_price: f64) -> f64 {
    win_rate * (1.0 - avg_entry_price) - (1.0 - win_rate) * avg_entry_price
}

/// Win rate, average entry and EV over the qualifying trades.
/// `total_markets` is the size of the analyzed market population, reported as-is.
pub fn aggregate(total_markets: usize, trades: &[QualifyingTrade]) -> AggregateResult {
    let qualifying_count = trades.len();
    let win_count = trades.iter().filter(|t| t.win).count();
    let loss_count = qualifying_count - win_count;

    if qualifying_count == 0 {
        return AggregateResult {
            total_markets,
            qualifying_count,
            win_count,
            loss_count,
            win_rate: 0.0,
            avg_entry_price: 0.0,
            expected_value: 0.0,
            status: AggregateStatus::NoData,
        };
    }

    let n = qualifying_count as f64;
    let win_rate = win_count as f64 / n;
    let avg_entry_price = trades.iter().map(|t| t.entry_price).sum::<f64>() / n;

    AggregateResult {
        total_markets,
        qualifying_count,
        win_count,
        loss_count,
        win_rate,
        avg_entry_price,
        expected_value: expected_value(win_rate, avg_entry_price),
        status: AggregateStatus::Ok,
    }
}

// ---------------------------------------------------------------------------
// Entry price distribution
// ---------------------------------------------------------------------------

/// Wins and losses for entries priced in `[lower, upper)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBucket {
    pub lower: f64,
    pub upper: f64,
    pub wins: usize,
    pub losses: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDistribution {
    pub count: u64,
    pub min: f64,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
    pub max: f64,
    /// One-cent buckets, ascending. Only non-empty buckets are listed.
    pub buckets: Vec<PriceBucket>,
}

/// Distribution of qualifying entry prices. None when there are no trades.
pub fn entry_distribution(trades: &[QualifyingTrade]) -> Option<EntryDistribution> {
    if trades.is_empty() {
        return None;
    }

    let mut hist = Histogram::<u64>::new_with_max(MAX_PRICE_BPS, 4).ok()?;
    let mut cents: BTreeMap<u64, (usize, usize)> = BTreeMap::new();
    for t in trades {
        let bps = to_bps(t.entry_price);
        let _ = hist.record(bps);
        let bucket = cents.entry(bps / 100).or_default();
        if t.win {
            bucket.0 += 1;
        } else {
            bucket.1 += 1;
        }
    }

    let buckets = cents
        .into_iter()
        .map(|(cent, (wins, losses))| PriceBucket {
            lower: cent as f64 / 100.0,
            upper: (cent + 1) as f64 / 100.0,
            wins,
            losses,
        })
        .collect();

    Some(EntryDistribution {
        count: hist.len(),
        min: from_bps(hist.min()),
        p10: from_bps(hist.value_at_quantile(0.10)),
        p50: from_bps(hist.value_at_quantile(0.50)),
        p90: from_bps(hist.value_at_quantile(0.90)),
        max: from_bps(hist.max()),
        buckets,
    })
}

fn to_bps(price: f64) -> u64 {
    ((price * BPS_PER_UNIT).round().max(0.0) as u64).min(MAX_PRICE_BPS)
}

fn from_bps(bps: u64) -> f64 {
    bps as f64 / BPS_PER_UNIT
}
