//! Event Metrics — aggregation backend for the event-sales dashboard.
//!
//! Loads the Sales and Views tables, then serves the metric endpoints.

use clap::Parser;
use event_metrics_api::ApiServer;
use event_metrics_core::config::AppConfig;
use event_metrics_reporting::AggregationEngine;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "event-metrics")]
#[command(about = "Aggregation backend for the event-sales dashboard")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, env = "EVENT_METRICS__NODE_ID")]
    node_id: Option<String>,

    /// Sales table CSV (overrides config)
    #[arg(long, env = "EVENT_METRICS__DATA__SALES_PATH")]
    sales: Option<String>,

    /// Views table CSV (overrides config)
    #[arg(long, env = "EVENT_METRICS__DATA__VIEWS_PATH")]
    views: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "EVENT_METRICS__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Do not start the Prometheus exporter
    #[arg(long, default_value_t = false)]
    no_metrics: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "event_metrics=info,tower_http=info".into()),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Event Metrics starting up");

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(path) = cli.sales {
        config.data.sales_path = path;
    }
    if let Some(path) = cli.views {
        config.data.views_path = path;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if cli.no_metrics {
        config.metrics.enabled = false;
    }

    info!(
        node_id = %config.node_id,
        sales_path = %config.data.sales_path,
        views_path = %config.data.views_path,
        http_port = config.api.http_port,
        cache_capacity = config.reporting.cache_capacity,
        "Configuration loaded"
    );

    // Load the reference tables; the dashboard has nothing to show without them
    let data = event_metrics_datasets::load_context(&config.data).map_err(|e| {
        error!(error = %e, "Failed to load reference tables");
        e
    })?;
    info!(
        sales_rows = data.sales().len(),
        views_rows = data.views().len(),
        "Reference tables loaded"
    );

    let engine = Arc::new(AggregationEngine::new(
        data,
        config.reporting.cache_capacity,
    ));

    let api_server = ApiServer::new(config.clone(), engine);

    // Start metrics exporter
    if config.metrics.enabled {
        if let Err(e) = api_server.start_metrics().await {
            error!(error = %e, "Failed to start metrics exporter");
        }
    }

    info!("Event Metrics is ready to serve traffic");

    // Start HTTP server (blocks until shutdown)
    api_server.start_http().await?;

    Ok(())
}
