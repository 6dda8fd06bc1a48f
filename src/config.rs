use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Lookback window bounds (days) for resolved markets.
pub const DEFAULT_DAYS_BACK: u32 = 7;
pub const MIN_DAYS_BACK: u32 = 1;
pub const MAX_DAYS_BACK: u32 = 7;

/// Entry price acceptance range. Both bounds are inclusive.
pub const DEFAULT_PRICE_MIN: f64 = 0.98;
pub const DEFAULT_PRICE_MAX: f64 = 1.00;

/// Minutes before resolution at which the entry price is sampled.
pub const DEFAULT_MINUTES_BEFORE: u32 = 2;

pub const DEFAULT_DB_PATH: &str = "polymarket.db";

/// SQLite busy timeout (seconds). Also bounds pool acquisition.
pub const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 30;

/// Read pool size. A run holds at most two connections (metadata + trades).
pub const DB_MAX_CONNECTIONS: u32 = 4;

/// Parameters of one backtest run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    /// N: markets resolved within the last `days_back` days are analyzed.
    pub days_back: u32,
    /// X_min: lowest accepted entry price, also the win threshold for settlement.
    pub price_min: f64,
    /// X_max: highest accepted entry price.
    pub price_max: f64,
    /// Y: entry price is the last trade at or before `resolution - minutes_before`.
    pub minutes_before: u32,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            days_back: DEFAULT_DAYS_BACK,
            price_min: DEFAULT_PRICE_MIN,
            price_max: DEFAULT_PRICE_MAX,
            minutes_before: DEFAULT_MINUTES_BEFORE,
        }
    }
}

impl AnalysisParams {
    /// Rejects out-of-range parameters. Called before any store query is issued.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_DAYS_BACK..=MAX_DAYS_BACK).contains(&self.days_back) {
            return Err(AppError::Config(format!(
                "days_back must be between {MIN_DAYS_BACK} and {MAX_DAYS_BACK}, got {}",
                self.days_back
            )));
        }
        for (name, value) in [("price_min", self.price_min), ("price_max", self.price_max)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(AppError::Config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.price_min > self.price_max {
            return Err(AppError::Config(format!(
                "price_min ({}) must not exceed price_max ({})",
                self.price_min, self.price_max
            )));
        }
        if self.minutes_before == 0 {
            return Err(AppError::Config(
                "minutes_before must be a positive number of minutes".to_string(),
            ));
        }
        Ok(())
    }

    /// True if `price` lies in `[price_min, price_max]`.
    pub fn accepts(&self, price: f64) -> bool {
        price >= self.price_min && price <= self.price_max
    }
}

/// Connection settings for the read-only market data store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub db_path: String,
    pub busy_timeout_secs: u64,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    /// HTTP API port (API_PORT). The API is only served when set.
    pub api_port: Option<u16>,
    pub store: StoreConfig,
    /// Print the startup report as JSON instead of text (REPORT_FORMAT=json).
    pub report_json: bool,
    /// Parameters of the startup run (BACKTEST_DAYS, BACKTEST_PRICE_MIN,
    /// BACKTEST_PRICE_MAX, BACKTEST_MINUTES_BEFORE).
    pub params: AnalysisParams,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_port = match std::env::var("API_PORT") {
            Ok(v) if !v.trim().is_empty() => Some(v.trim().parse::<u16>().map_err(|_| {
                AppError::Config("API_PORT must be a valid port number".to_string())
            })?),
            _ => None,
        };

        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port,
            store: StoreConfig {
                db_path: std::env::var("DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string()),
                busy_timeout_secs: env_or("DB_BUSY_TIMEOUT_SECS", DEFAULT_BUSY_TIMEOUT_SECS)?,
                max_connections: DB_MAX_CONNECTIONS,
            },
            report_json: std::env::var("REPORT_FORMAT")
                .map(|v| v.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            params: AnalysisParams {
                days_back: env_or("BACKTEST_DAYS", DEFAULT_DAYS_BACK)?,
                price_min: env_or("BACKTEST_PRICE_MIN", DEFAULT_PRICE_MIN)?,
                price_max: env_or("BACKTEST_PRICE_MAX", DEFAULT_PRICE_MAX)?,
                minutes_before: env_or("BACKTEST_MINUTES_BEFORE", DEFAULT_MINUTES_BEFORE)?,
            },
        })
    }
}

/// Reads `name` from the environment, falling back to `default` when unset.
/// A set but unparsable value is a configuration error, not a silent default.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::Config(format!("{name} has an invalid value: {raw:?}"))),
        Err(_) => Ok(default),
    }
}
