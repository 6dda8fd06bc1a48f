mod analysis;
mod api;
mod config;
mod db;
mod error;
mod report;
mod types;

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::analysis::run_analysis;
use crate::api::health::HealthState;
use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::db::MarketDataStore;
use crate::error::Result;
use crate::report::render_summary;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // Reject bad parameters before touching the database.
    cfg.params.validate()?;

    // --- Database setup ---
    let store = MarketDataStore::connect(&cfg.store).await?;
    store.migrate().await?;
    info!("Database ready at {}", cfg.store.db_path);

    // --- One-shot run with the configured parameters ---
    let health = Arc::new(HealthState::new());
    let now = Utc::now();
    let report = run_analysis(&store, &cfg.params, now).await?;
    health.record_success(now.timestamp());
    if cfg.report_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render_summary(&report));
    }

    // --- HTTP API (optional) ---
    let Some(port) = cfg.api_port else {
        return Ok(());
    };
    let app = router(ApiState { store, health });
    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
