pub mod models;
pub mod reader;

#[cfg(test)]
pub mod fixtures;

pub use reader::MarketDataStore;
