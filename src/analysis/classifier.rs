use crate::config::AnalysisParams;
use crate::types::{CanonicalMarket, EntrySample, QualifyingTrade};

/// Win when the settlement value reaches the entry threshold. Equality counts as a win.
pub fn is_win(outcome_price: f64, price_min: f64) -> bool {
    outcome_price >= price_min
}

/// Turns an entry sample into a simulated strategy entry.
/// Returns None when the entry price lies outside `[price_min, price_max]`:
/// the strategy would not have traded, so the market is not part of the population.
pub fn classify(
    market: &CanonicalMarket,
    sample: &EntrySample,
    final_price: Option<f64>,
    params: &AnalysisParams,
) -> Option<QualifyingTrade> {
    if !params.accepts(sample.entry_price) {
        return None;
    }
    Some(QualifyingTrade {
        market_id: market.market_id.clone(),
        asset_id: market.asset_id.clone(),
        question: market.question.clone(),
        outcome: market.outcome.clone(),
        resolution_time: market.resolution_time,
        entry_timestamp: sample.entry_timestamp,
        entry_price: sample.entry_price,
        outcome_price: market.outcome_price,
        final_price,
        win: is_win(market.outcome_price, params.price_min),
    })
}
