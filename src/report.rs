//! Plain-text rendering of an analysis report.

use std::fmt::Write;

use crate::analysis::AnalysisReport;

/// Human readable summary: sample sizes, win rate, payoff per outcome and EV.
pub fn render_summary(report: &AnalysisReport) -> String {
    let a = &report.aggregate;
    let p = &report.params;

    if !a.has_data() {
        return format!(
            "No qualifying trades found: {} resolved markets in the last {} days, none traded \
             between {:.2} and {:.2} at {} minutes before resolution.\n",
            a.total_markets, p.days_back, p.price_min, p.price_max, p.minutes_before,
        );
    }

    let gain_per_win = 1.0 - a.avg_entry_price;
    let loss_per_loss = a.avg_entry_price;
    let win_pct = (a.win_rate * 100.0).round() as u32;

    let mut out = String::new();
    let _ = writeln!(out, "Strategy analysis");
    let _ = writeln!(
        out,
        "Out of {} resolved markets, {} traded between {:.2} and {:.2} at {} minutes before \
         resolution.",
        a.total_markets, a.qualifying_count, p.price_min, p.price_max, p.minutes_before,
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Average entry price: {:.4}", a.avg_entry_price);
    let _ = writeln!(
        out,
        "Win rate: {:.2}% ({} wins out of {} trades)",
        a.win_rate * 100.0,
        a.win_count,
        a.qualifying_count,
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "In {win_pct} cases out of 100 you win ${gain_per_win:.4} per $1 wagered."
    );
    let _ = writeln!(
        out,
        "In {} cases out of 100 you lose ${loss_per_loss:.4} per $1 wagered.",
        100 - win_pct.min(100),
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Expected value: ${:.4} per $1 wagered", a.expected_value);
    let direction = if a.expected_value > 0.0 { "gain" } else { "lose" };
    let _ = writeln!(
        out,
        "For every $100 wagered you can expect to {direction} ${:.2} on average.",
        (a.expected_value * 100.0).abs(),
    );

    if let Some(d) = &report.distribution {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Entry prices: min {:.4} | p10 {:.4} | p50 {:.4} | p90 {:.4} | max {:.4}",
            d.min, d.p10, d.p50, d.p90, d.max,
        );
        for b in &d.buckets {
            let _ = writeln!(
                out,
                "  [{:.2}, {:.2}): {} wins, {} losses",
                b.lower, b.upper, b.wins, b.losses
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::pipeline::{analyze, AnalysisWindow};
    use crate::config::AnalysisParams;
    use crate::db::fixtures::{at, trade, MetaFixture};
    use crate::types::MarketMetadataRaw;

    const T: i64 = 1_700_000_000;

    fn report(outcomes: &[(f64, f64)]) -> AnalysisReport {
        let meta: Vec<MarketMetadataRaw> = outcomes
            .iter()
            .enumerate()
            .map(|(i, (_, settle))| {
                let (market, token) = (format!("m{i}"), format!("tok{i}"));
                MetaFixture::resolved(&market, &token, T - 3_600, *settle).raw()
            })
            .collect();
        let trades = outcomes
            .iter()
            .enumerate()
            .map(|(i, (entry, _))| trade(&format!("tok{i}"), T - 4_000, i as i64, 0, *entry))
            .collect();
        analyze(&meta, trades, &AnalysisParams::default(), AnalysisWindow::ending_at(at(T), 7))
    }

    #[test]
    fn empty_report_says_no_qualifying_trades() {
        let text = render_summary(&report(&[(0.50, 1.0)]));
        assert!(text.starts_with("No qualifying trades found"));
        assert!(text.contains("1 resolved markets"));
    }

    #[test]
    fn positive_ev_summary() {
        let text = render_summary(&report(&[(0.99, 1.0), (0.99, 1.0)]));
        assert!(text.contains("Win rate: 100.00% (2 wins out of 2 trades)"));
        assert!(text.contains("Expected value: $0.0100 per $1 wagered"));
        assert!(text.contains("expect to gain $1.00"));
        assert!(text.contains("[0.99, 1.00): 2 wins, 0 losses"));
    }

    #[test]
    fn negative_ev_summary() {
        let text = render_summary(&report(&[(0.99, 1.0), (0.99, 0.0)]));
        assert!(text.contains("In 50 cases out of 100 you lose $0.9900"));
        assert!(text.contains("expect to lose $49.00"));
    }
}
