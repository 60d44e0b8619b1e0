//! OpenAPI specification for the dashboard API.

use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Event Metrics API",
        version = "0.1.0",
        description = "Aggregations behind the event-sales dashboard.\n\nConversion rate, profitability index, customer satisfaction and view time over the Sales and Views tables.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Metrics", description = "Metric aggregations"),
        (name = "Dashboard", description = "Filter options and initial queries"),
        (name = "Admin", description = "Table reload"),
        (name = "Operations", description = "Health, readiness, and liveness probes"),
    ),
    paths(
        // Metrics
        crate::metrics_rest::handle_conversion,
        crate::metrics_rest::handle_profitability,
        crate::metrics_rest::handle_satisfaction,
        crate::metrics_rest::handle_view_time,
        crate::metrics_rest::handle_query,
        // Dashboard
        crate::metrics_rest::handle_filters,
        crate::metrics_rest::handle_defaults,
        // Admin
        crate::metrics_rest::handle_reload,
        // Operations
        crate::rest::health_check,
        crate::rest::readiness,
        crate::rest::liveness,
    ),
    components(schemas(
        // Query parameters
        event_metrics_reporting::ConversionParams,
        event_metrics_reporting::ConversionMode,
        event_metrics_reporting::ProfitabilityParams,
        event_metrics_reporting::SatisfactionParams,
        event_metrics_reporting::SatisfactionMode,
        event_metrics_reporting::ViewTimeParams,
        event_metrics_reporting::DateWindow,
        event_metrics_reporting::FilterOptions,
        event_metrics_reporting::DefaultQueries,
        // Results
        event_metrics_core::types::AggregationResult,
        event_metrics_core::types::SeriesRow,
        event_metrics_core::types::MetricKind,
        event_metrics_core::types::ChartKind,
        event_metrics_core::types::AxisRange,
        // Tables
        event_metrics_core::types::SalesRecord,
        event_metrics_core::types::ViewRecord,
        // REST error/health types
        crate::rest::ErrorResponse,
        crate::rest::HealthResponse,
        crate::metrics_rest::ReloadResponse,
    ))
)]
pub struct ApiDoc;

/// GET /api-docs/openapi.json — The generated OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
