use crate::tracker::{CycleOutcome, TrackerConfig};
use anyhow::Result;
use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::info;

// -----------------------------------------------
// API RESPONSE MODELS
// -----------------------------------------------

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub processing_time_ms: Option<u64>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T, start: Instant) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            processing_time_ms: Some(start.elapsed().as_millis() as u64),
        }
    }

    fn err(message: impl Into<String>, start: Instant) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            processing_time_ms: Some(start.elapsed().as_millis() as u64),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub started_at: NaiveDateTime,
    pub last_cycle_at: Option<NaiveDateTime>,
    pub last_alert: bool,
}

// -----------------------------------------------
// APPLICATION STATE
// -----------------------------------------------

/// Latest outcome published by the scheduler, `None` until the first cycle ends
pub type OutcomeSender = watch::Sender<Option<CycleOutcome>>;

#[derive(Clone)]
pub struct AppState {
    latest: watch::Receiver<Option<CycleOutcome>>,
    config: Arc<TrackerConfig>,
    started_at: NaiveDateTime,
}

impl AppState {
    pub fn new(config: TrackerConfig) -> (Self, OutcomeSender) {
        let (tx, rx) = watch::channel(None);
        let state = Self {
            latest: rx,
            config: Arc::new(config),
            started_at: Local::now().naive_local(),
        };
        (state, tx)
    }
}

// -----------------------------------------------
// API HANDLERS
// -----------------------------------------------

/// GET /api/health
async fn get_health(State(app_state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let start = Instant::now();
    let latest = app_state.latest.borrow();
    let last_cycle_at = latest.as_ref().map(|o| match o {
        CycleOutcome::Completed(report) => report.at,
        CycleOutcome::Skipped { at, .. } => *at,
    });
    let last_alert = latest.as_ref().is_some_and(CycleOutcome::alert_triggered);

    Json(ApiResponse::ok(
        HealthResponse {
            status: "ok",
            started_at: app_state.started_at,
            last_cycle_at,
            last_alert,
        },
        start,
    ))
}

/// GET /api/oi/latest - outcome of the most recent cycle
async fn get_latest(
    State(app_state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<CycleOutcome>>) {
    let start = Instant::now();
    let latest = app_state.latest.borrow().clone();
    match latest {
        Some(outcome) => (StatusCode::OK, Json(ApiResponse::ok(outcome, start))),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err("no cycle has completed yet", start)),
        ),
    }
}

/// GET /api/config - active tracker configuration
async fn get_config(State(app_state): State<AppState>) -> Json<ApiResponse<TrackerConfig>> {
    let start = Instant::now();
    Json(ApiResponse::ok(app_state.config.as_ref().clone(), start))
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(get_health))
        .route("/api/oi/latest", get(get_latest))
        .route("/api/config", get(get_config))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

pub async fn start_server(port: u16, app_state: AppState) -> Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%addr, "OI tracker API listening");
    println!("🚀 OI Tracker API running on http://{}", addr);
    println!("📋 Available endpoints:");
    println!("   GET  /api/health");
    println!("   GET  /api/oi/latest");
    println!("   GET  /api/config");
    println!();

    axum::serve(listener, router(app_state)).await?;
    Ok(())
}
