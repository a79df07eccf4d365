// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. The API is a thin shell: every
// evaluation goes through `engine::evaluate_signals`, every batch through
// `scan::run_scan`.
//
// CORS is configured permissively for development; tighten `allowed_origins`
// in production.
// =============================================================================

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::error::{ApiError, ApiResult};
use crate::app_state::AppState;
use crate::engine::{evaluate_series, evaluate_signals};
use crate::market_data::{Candle, MarketDataset, MoneyFlowPoint, SeriesKey};
use crate::scan::{run_scan, ScanReport, ScanRequest};
use crate::scoring_config::ScoringConfig;
use crate::types::{KeyLevel, Signal};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS/trace middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/evaluate", post(evaluate))
        .route(
            "/api/v1/datasets/:symbol/:period",
            put(put_dataset).delete(delete_dataset),
        )
        .route("/api/v1/signals/:symbol/:period", get(series_signals))
        .route(
            "/api/v1/config/scoring",
            get(get_scoring).put(put_scoring),
        )
        .route("/api/v1/scan", post(start_scan))
        .route("/api/v1/scan/cancel", post(cancel_scan))
        .route("/api/v1/scan/latest", get(latest_scan))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    state_version: u64,
    datasets: usize,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        state_version: state.current_state_version(),
        datasets: state.store.len(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Ad-hoc evaluation
// =============================================================================

#[derive(Deserialize)]
struct EvaluateRequest {
    candles: Vec<Candle>,
    #[serde(default)]
    key_levels: Vec<KeyLevel>,
    #[serde(default)]
    money_flow: Vec<MoneyFlowPoint>,
    #[serde(default)]
    scoring: Option<ScoringConfig>,
}

async fn evaluate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EvaluateRequest>,
) -> ApiResult<Json<Vec<Signal>>> {
    let scoring = match req.scoring {
        Some(cfg) => {
            cfg.validate()
                .map_err(|e| ApiError::BadRequest(format!("{e:#}")))?;
            cfg
        }
        None => state.runtime_config.read().scoring.clone(),
    };
    let signals = evaluate_signals(&req.candles, &req.key_levels, &req.money_flow, &scoring);
    Ok(Json(signals))
}

// =============================================================================
// Datasets
// =============================================================================

#[derive(Serialize)]
struct DatasetStored {
    series: String,
    candles: usize,
    key_levels: usize,
    money_flow: usize,
}

async fn put_dataset(
    State(state): State<Arc<AppState>>,
    Path((symbol, period)): Path<(String, String)>,
    Json(dataset): Json<MarketDataset>,
) -> impl IntoResponse {
    let key = SeriesKey::new(symbol, period);
    let resp = DatasetStored {
        series: key.to_string(),
        candles: dataset.candles.len(),
        key_levels: dataset.key_levels.len(),
        money_flow: dataset.money_flow.len(),
    };
    state.store.insert(key, dataset);
    state.increment_version();
    (StatusCode::CREATED, Json(resp))
}

async fn delete_dataset(
    State(state): State<Arc<AppState>>,
    Path((symbol, period)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let key = SeriesKey::new(symbol, period);
    if !state.store.remove(&key) {
        return Err(ApiError::NotFound(format!("no dataset for {key}")));
    }
    state.increment_version();
    Ok(StatusCode::NO_CONTENT)
}

async fn series_signals(
    State(state): State<Arc<AppState>>,
    Path((symbol, period)): Path<(String, String)>,
) -> ApiResult<Json<Vec<Signal>>> {
    let key = SeriesKey::new(symbol, period);
    if state.store.get(&key).is_none() {
        return Err(ApiError::NotFound(format!("no dataset for {key}")));
    }
    let (bars, scoring) = {
        let config = state.runtime_config.read();
        (config.scan_bars, config.scoring.clone())
    };
    let evaluated = evaluate_series(state.store.as_ref(), &key, bars, &scoring)?;
    Ok(Json(evaluated.signals))
}

// =============================================================================
// Scoring config
// =============================================================================

async fn get_scoring(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.runtime_config.read().scoring.clone())
}

async fn put_scoring(
    State(state): State<Arc<AppState>>,
    Json(scoring): Json<ScoringConfig>,
) -> ApiResult<Json<ScoringConfig>> {
    scoring
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("{e:#}")))?;

    let config_clone = {
        let mut config = state.runtime_config.write();
        config.scoring = scoring.clone();
        config.clone()
    };
    info!(
        break_pct = scoring.break_pct,
        money_flow_days = scoring.money_flow_days,
        obv_lookback = scoring.obv_lookback,
        "scoring config updated"
    );

    if let Some(path) = &state.config_path {
        // Best-effort; the in-memory config is already live.
        if let Err(e) = config_clone.save(path) {
            warn!(error = %e, "failed to save scoring config to disk");
        }
    }
    state.increment_version();
    Ok(Json(scoring))
}

// =============================================================================
// Market scan
// =============================================================================

#[derive(Deserialize)]
struct ScanBody {
    #[serde(default)]
    symbols: Vec<String>,
    #[serde(default)]
    period: Option<String>,
    #[serde(default)]
    bars: Option<usize>,
    #[serde(default)]
    scoring: Option<ScoringConfig>,
}

async fn start_scan(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ScanBody>,
) -> ApiResult<Json<ScanReport>> {
    if let Some(cfg) = &body.scoring {
        cfg.validate()
            .map_err(|e| ApiError::BadRequest(format!("{e:#}")))?;
    }
    let Some(_slot) = state.try_claim_scan() else {
        return Err(ApiError::Conflict("a market scan is already running".into()));
    };

    let (request, scoring, limits) = {
        let config = state.runtime_config.read();
        let request = ScanRequest {
            symbols: body.symbols,
            period: body.period.unwrap_or_else(|| config.default_period.clone()),
            bars: body.bars.unwrap_or(config.scan_bars),
            scoring: body.scoring,
        };
        (request, config.scoring.clone(), config.scan_limits())
    };

    let cancel = state.begin_scan();
    let report = run_scan(state.store.clone(), request, scoring, limits, cancel).await;

    *state.last_scan.write() = Some(report.clone());
    state.increment_version();
    Ok(Json(report))
}

async fn cancel_scan(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let running = state.scan_running.load(Ordering::SeqCst);
    if running {
        state.cancel_scan();
        info!("market scan cancel requested");
    }
    Json(serde_json::json!({ "cancelled": running }))
}

async fn latest_scan(State(state): State<Arc<AppState>>) -> ApiResult<Json<ScanReport>> {
    state
        .last_scan
        .read()
        .clone()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("no market scan has run yet".into()))
}
