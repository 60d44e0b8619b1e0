//! CSV loader for the Sales and Views tables.

use crate::schema::{SalesRow, ViewRow};
use event_metrics_core::config::DataConfig;
use event_metrics_core::types::{SalesRecord, ViewRecord};
use event_metrics_core::{MetricsError, MetricsResult};
use event_metrics_reporting::DataContext;
use serde::de::DeserializeOwned;
use std::io;
use std::path::Path;
use tracing::info;

pub fn load_sales(path: impl AsRef<Path>) -> MetricsResult<Vec<SalesRecord>> {
    load_table::<SalesRow, SalesRecord>(path.as_ref())
}

pub fn load_views(path: impl AsRef<Path>) -> MetricsResult<Vec<ViewRecord>> {
    load_table::<ViewRow, ViewRecord>(path.as_ref())
}

/// Load both tables named by the data config into a fresh context.
pub fn load_context(config: &DataConfig) -> MetricsResult<DataContext> {
    let sales = load_sales(&config.sales_path)?;
    let views = load_views(&config.views_path)?;
    Ok(DataContext::new(sales, views))
}

pub fn read_sales<R: io::Read>(reader: R) -> MetricsResult<Vec<SalesRecord>> {
    read_table::<R, SalesRow, SalesRecord>(reader, "<sales>")
}

pub fn read_views<R: io::Read>(reader: R) -> MetricsResult<Vec<ViewRecord>> {
    read_table::<R, ViewRow, ViewRecord>(reader, "<views>")
}

fn load_table<Row, Record>(path: &Path) -> MetricsResult<Vec<Record>>
where
    Row: DeserializeOwned,
    Record: From<Row>,
{
    let source = path.display().to_string();
    let file = std::fs::File::open(path)
        .map_err(|e| MetricsError::DataLoad(format!("{source}: {e}")))?;
    let records = read_table::<_, Row, Record>(file, &source)?;
    info!(path = %source, rows = records.len(), "Table loaded");
    Ok(records)
}

fn read_table<R, Row, Record>(reader: R, source: &str) -> MetricsResult<Vec<Record>>
where
    R: io::Read,
    Row: DeserializeOwned,
    Record: From<Row>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in csv_reader.deserialize::<Row>() {
        let row = row.map_err(|e| load_error(source, &e))?;
        records.push(Record::from(row));
    }
    Ok(records)
}

fn load_error(source: &str, err: &csv::Error) -> MetricsError {
    match err.position() {
        Some(pos) => MetricsError::DataLoad(format!("{source}: line {}: {err}", pos.line())),
        None => MetricsError::DataLoad(format!("{source}: {err}")),
    }
}
