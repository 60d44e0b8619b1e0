//! API server — dashboard REST endpoints plus the Prometheus exporter.

use crate::metrics_rest;
use crate::rest::{self, AppState};
use crate::swagger;
use axum::routing::{get, post};
use axum::Router;
use event_metrics_core::config::AppConfig;
use event_metrics_reporting::AggregationEngine;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the full HTTP router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Metric aggregations
        .route("/v1/metrics/conversion", post(metrics_rest::handle_conversion))
        .route("/v1/metrics/profitability", post(metrics_rest::handle_profitability))
        .route("/v1/metrics/satisfaction", post(metrics_rest::handle_satisfaction))
        .route("/v1/metrics/view-time", post(metrics_rest::handle_view_time))
        .route("/v1/metrics/query", post(metrics_rest::handle_query))
        // Dashboard controls
        .route("/v1/filters", get(metrics_rest::handle_filters))
        .route("/v1/defaults", get(metrics_rest::handle_defaults))
        .route("/v1/admin/reload", post(metrics_rest::handle_reload))
        // Operational endpoints
        .route("/health", get(rest::health_check))
        .route("/ready", get(rest::readiness))
        .route("/live", get(rest::liveness))
        .route("/api-docs/openapi.json", get(swagger::openapi_json))
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct ApiServer {
    config: AppConfig,
    engine: Arc<AggregationEngine>,
}

impl ApiServer {
    pub fn new(config: AppConfig, engine: Arc<AggregationEngine>) -> Self {
        Self { config, engine }
    }

    /// Start the HTTP REST server.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let state = AppState::new(
            self.engine.clone(),
            self.config.data.clone(),
            self.config.node_id.clone(),
        );
        let app = router(state);

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);
        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the metrics server on a separate port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
        let handle = builder
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install_recorder()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");

        // Keep the handle alive
        std::mem::forget(handle);
        Ok(())
    }
}
