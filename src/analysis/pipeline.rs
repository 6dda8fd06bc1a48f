use chrono::{DateTime, Duration, Utc};
use futures_util::future::try_join;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::aggregator::{
    aggregate, entry_distribution, AggregateResult, EntryDistribution,
};
use crate::analysis::classifier::classify;
use crate::analysis::dedup::deduplicate;
use crate::analysis::sampler::TradeTimeline;
use crate::config::AnalysisParams;
use crate::db::MarketDataStore;
use crate::error::Result;
use crate::types::{CanonicalMarket, MarketMetadataRaw, QualifyingTrade, Trade};

/// Markets dropped before reaching the statistics, per reason.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExclusionCounts {
    pub unresolved: usize,
    pub missing_end_date: usize,
    pub outside_window: usize,
    pub no_trade_before_cutoff: usize,
    pub out_of_range: usize,
    /// Fills skipped as price observations (zero or negative token amount).
    pub invalid_trades: usize,
}

/// Resolution-time window `[start, end]` of the analyzed markets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AnalysisWindow {
    pub fn ending_at(end: DateTime<Utc>, days_back: u32) -> Self {
        Self {
            start: end - Duration::days(i64::from(days_back)),
            end,
        }
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t <= self.end
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub params: AnalysisParams,
    pub window: AnalysisWindow,
    pub aggregate: AggregateResult,
    pub distribution: Option<EntryDistribution>,
    pub exclusions: ExclusionCounts,
    /// Ordered by resolution time descending, then market id.
    pub trades: Vec<QualifyingTrade>,
}

/// Canonical resolved markets of a window, without trade sampling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedMarkets {
    pub window: AnalysisWindow,
    pub markets: Vec<CanonicalMarket>,
    pub exclusions: ExclusionCounts,
}

/// Runs one backtest against the store for markets resolved in the `days_back`
/// days up to `as_of`. Parameters are validated before any query is issued, and
/// a failed read aborts the run without a partial report.
pub async fn run_analysis(
    store: &MarketDataStore,
    params: &AnalysisParams,
    as_of: DateTime<Utc>,
) -> Result<AnalysisReport> {
    params.validate()?;
    let window = AnalysisWindow::ending_at(as_of, params.days_back);
    info!(
        days_back = params.days_back,
        price_min = params.price_min,
        price_max = params.price_max,
        minutes_before = params.minutes_before,
        "[ANALYSIS] run started | window {} .. {}",
        window.start,
        window.end,
    );

    let (metadata, trades) = try_join(
        store.fetch_metadata(window.start, window.end),
        store.fetch_trades(window.start, window.end),
    )
    .await?;
    info!(
        metadata_rows = metadata.len(),
        trade_rows = trades.len(),
        "[ANALYSIS] store reads complete"
    );

    let report = analyze(&metadata, trades, params, window);
    log_report(&report);
    Ok(report)
}

/// Deduplicated resolved markets of the window, most recent resolution first.
pub async fn resolved_markets(
    store: &MarketDataStore,
    days_back: u32,
    as_of: DateTime<Utc>,
) -> Result<ResolvedMarkets> {
    AnalysisParams { days_back, ..Default::default() }.validate()?;
    let window = AnalysisWindow::ending_at(as_of, days_back);
    let metadata = store.fetch_metadata(window.start, window.end).await?;
    let (mut markets, exclusions) = canonical_in_window(&metadata, window);
    markets.sort_by(|a, b| {
        b.resolution_time
            .cmp(&a.resolution_time)
            .then_with(|| a.market_id.cmp(&b.market_id))
    });
    Ok(ResolvedMarkets { window, markets, exclusions })
}

/// The pure part of a run: dedup, sample, filter, classify, aggregate.
pub fn analyze(
    metadata: &[MarketMetadataRaw],
    trades: Vec<Trade>,
    params: &AnalysisParams,
    window: AnalysisWindow,
) -> AnalysisReport {
    let (markets, mut exclusions) = canonical_in_window(metadata, window);
    let timeline = TradeTimeline::build(trades);
    exclusions.invalid_trades = timeline.invalid_trades();
    debug!(
        markets = markets.len(),
        assets = timeline.asset_count(),
        "[ANALYSIS] trade timeline built"
    );

    let mut qualifying = Vec::new();
    for market in &markets {
        let Some(sample) = timeline.sample(market, params.minutes_before) else {
            debug!(market_id = %market.market_id, "[ANALYSIS] no trade before cutoff");
            exclusions.no_trade_before_cutoff += 1;
            continue;
        };
        let final_price = timeline
            .price_at_or_before(&market.asset_id, market.resolution_time)
            .map(|(_, price)| price);
        match classify(market, &sample, final_price, params) {
            Some(trade) => qualifying.push(trade),
            None => {
                debug!(
                    market_id = %market.market_id,
                    entry_price = sample.entry_price,
                    "[ANALYSIS] entry price out of range"
                );
                exclusions.out_of_range += 1;
            }
        }
    }

    qualifying.sort_by(|a, b| {
        b.resolution_time
            .cmp(&a.resolution_time)
            .then_with(|| a.market_id.cmp(&b.market_id))
    });

    AnalysisReport {
        params: *params,
        window,
        aggregate: aggregate(markets.len(), &qualifying),
        distribution: entry_distribution(&qualifying),
        exclusions,
        trades: qualifying,
    }
}

fn canonical_in_window(
    metadata: &[MarketMetadataRaw],
    window: AnalysisWindow,
) -> (Vec<CanonicalMarket>, ExclusionCounts) {
    let dedup = deduplicate(metadata);
    let mut exclusions = ExclusionCounts {
        unresolved: dedup.unresolved,
        missing_end_date: dedup.missing_end_date,
        ..Default::default()
    };
    let markets: Vec<CanonicalMarket> = dedup
        .markets
        .into_iter()
        .filter(|m| {
            let inside = window.contains(m.resolution_time);
            if !inside {
                exclusions.outside_window += 1;
            }
            inside
        })
        .collect();
    (markets, exclusions)
}

fn log_report(report: &AnalysisReport) {
    let a = &report.aggregate;
    let e = &report.exclusions;
    info!(
        unresolved = e.unresolved,
        missing_end_date = e.missing_end_date,
        outside_window = e.outside_window,
        no_trade_before_cutoff = e.no_trade_before_cutoff,
        out_of_range = e.out_of_range,
        invalid_trades = e.invalid_trades,
        "[ANALYSIS] exclusions"
    );
    info!(
        total_markets = a.total_markets,
        qualifying = a.qualifying_count,
        wins = a.win_count,
        losses = a.loss_count,
        status = %a.status,
        "[ANALYSIS] win_rate: {:.2}% | avg_entry: {:.4} | EV: ${:.4} per $1",
        a.win_rate * 100.0,
        a.avg_entry_price,
        a.expected_value,
    );
}
