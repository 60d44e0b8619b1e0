//! Metric aggregation endpoints, filter options and table reload.

use crate::rest::{AppState, ErrorResponse};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use event_metrics_core::types::AggregationResult;
use event_metrics_core::MetricsError;
use event_metrics_reporting::{
    ConversionParams, DefaultQueries, FilterOptions, MetricQuery, ProfitabilityParams,
    SatisfactionParams, ViewTimeParams,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use utoipa::ToSchema;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn run_query(state: &AppState, query: MetricQuery) -> ApiResult<AggregationResult> {
    let metric = query.metric().as_str();
    if let Err(e) = query.validate() {
        warn!(metric, error = %e, "Metric query validation failed");
        metrics::counter!("api.validation_errors").increment(1);
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("invalid_query", e.to_string())),
        ));
    }
    metrics::counter!("api.metric_requests", "metric" => metric).increment(1);
    let result = state.engine.run(&query);
    Ok(Json(result.as_ref().clone()))
}

/// POST /v1/metrics/conversion — Daily conversion rate (tickets / views).
#[utoipa::path(
    post,
    path = "/v1/metrics/conversion",
    tag = "Metrics",
    request_body = ConversionParams,
    responses(
        (status = 200, description = "Conversion-rate series", body = AggregationResult),
        (status = 400, description = "Start date after end date", body = ErrorResponse),
    )
)]
pub async fn handle_conversion(
    State(state): State<AppState>,
    Json(params): Json<ConversionParams>,
) -> ApiResult<AggregationResult> {
    run_query(&state, MetricQuery::ConversionRate(params))
}

/// POST /v1/metrics/profitability — Profitability index per category.
#[utoipa::path(
    post,
    path = "/v1/metrics/profitability",
    tag = "Metrics",
    request_body = ProfitabilityParams,
    responses((status = 200, description = "Profitability series or bars", body = AggregationResult))
)]
pub async fn handle_profitability(
    State(state): State<AppState>,
    Json(params): Json<ProfitabilityParams>,
) -> ApiResult<AggregationResult> {
    run_query(&state, MetricQuery::ProfitabilityIndex(params))
}

/// POST /v1/metrics/satisfaction — Mean customer satisfaction (1–5 scale).
#[utoipa::path(
    post,
    path = "/v1/metrics/satisfaction",
    tag = "Metrics",
    request_body = SatisfactionParams,
    responses((status = 200, description = "Satisfaction series or bars", body = AggregationResult))
)]
pub async fn handle_satisfaction(
    State(state): State<AppState>,
    Json(params): Json<SatisfactionParams>,
) -> ApiResult<AggregationResult> {
    run_query(&state, MetricQuery::Satisfaction(params))
}

/// POST /v1/metrics/view-time — Total seconds viewed per day.
#[utoipa::path(
    post,
    path = "/v1/metrics/view-time",
    tag = "Metrics",
    request_body = ViewTimeParams,
    responses(
        (status = 200, description = "View-time series", body = AggregationResult),
        (status = 400, description = "Start date after end date", body = ErrorResponse),
    )
)]
pub async fn handle_view_time(
    State(state): State<AppState>,
    Json(params): Json<ViewTimeParams>,
) -> ApiResult<AggregationResult> {
    run_query(&state, MetricQuery::ViewTime(params))
}

/// POST /v1/metrics/query — Any metric, selected by the `metric` field
/// (`conversion_rate`, `profitability_index`, `satisfaction`, `view_time`)
/// with that metric's parameters alongside it.
#[utoipa::path(
    post,
    path = "/v1/metrics/query",
    tag = "Metrics",
    responses(
        (status = 200, description = "Aggregation result", body = AggregationResult),
        (status = 400, description = "Invalid query", body = ErrorResponse),
    )
)]
pub async fn handle_query(
    State(state): State<AppState>,
    Json(query): Json<MetricQuery>,
) -> ApiResult<AggregationResult> {
    run_query(&state, query)
}

/// GET /v1/filters — Choices for every dashboard filter control.
#[utoipa::path(
    get,
    path = "/v1/filters",
    tag = "Dashboard",
    responses((status = 200, description = "Distinct cities, categories, events and date ranges", body = FilterOptions))
)]
pub async fn handle_filters(State(state): State<AppState>) -> Json<FilterOptions> {
    Json(state.engine.filter_options())
}

/// GET /v1/defaults — Initial dashboard queries (everything selected).
#[utoipa::path(
    get,
    path = "/v1/defaults",
    tag = "Dashboard",
    responses((status = 200, description = "Initial parameters per metric", body = DefaultQueries))
)]
pub async fn handle_defaults(State(state): State<AppState>) -> Json<DefaultQueries> {
    Json(state.engine.default_queries())
}

/// POST /v1/admin/reload — Re-read both tables from disk and swap them in.
#[utoipa::path(
    post,
    path = "/v1/admin/reload",
    tag = "Admin",
    responses(
        (status = 200, description = "Tables reloaded", body = ReloadResponse),
        (status = 500, description = "Load failed; previous tables stay active", body = ErrorResponse),
    )
)]
pub async fn handle_reload(State(state): State<AppState>) -> ApiResult<ReloadResponse> {
    let data = state.data.clone();
    let task = tokio::task::spawn_blocking(move || event_metrics_datasets::load_context(&data));
    let loaded = match task.await {
        Ok(result) => result,
        Err(e) => Err(MetricsError::Internal(e.into())),
    };

    match loaded {
        Ok(ctx) => {
            let sales_rows = ctx.sales().len();
            let views_rows = ctx.views().len();
            let generation = state.engine.reload(ctx);
            info!(generation, sales_rows, views_rows, "Tables reloaded");
            metrics::counter!("api.reloads").increment(1);
            Ok(Json(ReloadResponse {
                generation,
                sales_rows,
                views_rows,
            }))
        }
        Err(e) => {
            error!(error = %e, "Table reload failed");
            metrics::counter!("api.errors").increment(1);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("reload_failed", e.to_string())),
            ))
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReloadResponse {
    pub generation: u64,
    pub sales_rows: usize,
    pub views_rows: usize,
}
