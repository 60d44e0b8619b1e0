//! Shared handler state, error body and operational endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use event_metrics_core::config::DataConfig;
use event_metrics_reporting::AggregationEngine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use utoipa::ToSchema;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AggregationEngine>,
    /// Where `/v1/admin/reload` reads the tables from.
    pub data: DataConfig,
    pub node_id: String,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(engine: Arc<AggregationEngine>, data: DataConfig, node_id: impl Into<String>) -> Self {
        Self {
            engine,
            data,
            node_id: node_id.into(),
            start_time: Instant::now(),
        }
    }
}

/// GET /health — Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Operations",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        data_generation: state.engine.generation(),
    })
}

/// GET /ready — Readiness probe.
/// Returns 200 once a snapshot of the tables is installed.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Operations",
    responses((status = 200, description = "Ready to serve aggregations"))
)]
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.engine.generation() > 0 {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /live — Liveness probe.
#[utoipa::path(
    get,
    path = "/live",
    tag = "Operations",
    responses((status = 200, description = "Process is alive"))
)]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
    pub data_generation: u64,
}
