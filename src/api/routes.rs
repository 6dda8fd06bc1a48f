use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::analysis::pipeline::ResolvedMarkets;
use crate::analysis::{resolved_markets, run_analysis, AnalysisReport};
use crate::api::health::HealthState;
use crate::config::{AnalysisParams, DEFAULT_DAYS_BACK};
use crate::db::MarketDataStore;
use crate::error::AppError;

#[derive(Clone)]
pub struct ApiState {
    pub store: MarketDataStore,
    pub health: Arc<HealthState>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/analysis", get(get_analysis))
        .route("/markets/resolved", get(get_resolved_markets))
        .route("/health", get(get_health))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct AnalysisQuery {
    pub days: Option<u32>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub minutes_before: Option<u32>,
}

impl AnalysisQuery {
    fn into_params(self) -> AnalysisParams {
        let defaults = AnalysisParams::default();
        AnalysisParams {
            days_back: self.days.unwrap_or(defaults.days_back),
            price_min: self.price_min.unwrap_or(defaults.price_min),
            price_max: self.price_max.unwrap_or(defaults.price_max),
            minutes_before: self.minutes_before.unwrap_or(defaults.minutes_before),
        }
    }
}

#[derive(Deserialize)]
pub struct ResolvedQuery {
    pub days: Option<u32>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub runs_completed: u64,
    pub runs_failed: u64,
    pub last_run_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_analysis(
    State(state): State<ApiState>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<AnalysisReport>, AppError> {
    let params = query.into_params();
    let now = Utc::now();
    match run_analysis(&state.store, &params, now).await {
        Ok(report) => {
            state.health.record_success(now.timestamp());
            Ok(Json(report))
        }
        Err(e) => {
            if !matches!(e, AppError::Config(_)) {
                state.health.record_failure();
            }
            warn!("[API] analysis rejected: {e}");
            Err(e)
        }
    }
}

async fn get_resolved_markets(
    State(state): State<ApiState>,
    Query(query): Query<ResolvedQuery>,
) -> Result<Json<ResolvedMarkets>, AppError> {
    let days = query.days.unwrap_or(DEFAULT_DAYS_BACK);
    let resolved = resolved_markets(&state.store, days, Utc::now()).await?;
    Ok(Json(resolved))
}

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        runs_completed: state.health.runs_completed(),
        runs_failed: state.health.runs_failed(),
        last_run_at: state
            .health
            .last_run_at()
            .and_then(|secs| DateTime::from_timestamp(secs, 0)),
    })
}
