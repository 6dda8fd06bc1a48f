pub mod aggregator;
pub mod classifier;
pub mod dedup;
pub mod pipeline;
pub mod sampler;

pub use pipeline::{resolved_markets, run_analysis, AnalysisReport};
