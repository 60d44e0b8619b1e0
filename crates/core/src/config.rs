use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `EVENT_METRICS__` and an optional TOML config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// Location of the two reference tables.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_sales_path")]
    pub sales_path: String,
    #[serde(default = "default_views_path")]
    pub views_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
    /// Maximum number of memoized aggregation results. 0 disables the cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

/// Settings for the offline fixture generator.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_sales_rows")]
    pub sales_rows: usize,
    #[serde(default = "default_views_rows")]
    pub views_rows: usize,
    #[serde(default = "default_year")]
    pub year: i32,
    #[serde(default = "default_user_pool")]
    pub user_pool: u32,
    #[serde(default)]
    pub seed: Option<u64>,
}

// Default functions
fn default_node_id() -> String {
    "dashboard-01".to_string()
}
fn default_sales_path() -> String {
    "data/ventas_eventos.csv".to_string()
}
fn default_views_path() -> String {
    "data/vistas_eventos.csv".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8050
}
fn default_metrics_enabled() -> bool {
    true
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_cache_capacity() -> usize {
    1024
}
fn default_sales_rows() -> usize {
    500
}
fn default_views_rows() -> usize {
    1000
}
fn default_year() -> i32 {
    2024
}
fn default_user_pool() -> u32 {
    300
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            sales_path: default_sales_path(),
            views_path: default_views_path(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            port: default_metrics_port(),
        }
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sales_rows: default_sales_rows(),
            views_rows: default_views_rows(),
            year: default_year(),
            user_pool: default_user_pool(),
            seed: None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            data: DataConfig::default(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            reporting: ReportingConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and optional config file.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/event-metrics").required(false))
            .add_source(
                config::Environment::with_prefix("EVENT_METRICS")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
