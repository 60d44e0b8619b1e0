//! Column layout of the fixture files.
//!
//! Headers are the ones the dashboard has always shipped with; English
//! snake_case headers are accepted as well when reading.

use chrono::NaiveDate;
use event_metrics_core::types::{SalesRecord, ViewRecord};
use serde::{Deserialize, Deserializer, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRow {
    #[serde(rename = "Fecha", alias = "date", deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
    #[serde(rename = "Evento", alias = "event")]
    pub event: String,
    #[serde(rename = "Categoría", alias = "category")]
    pub category: String,
    #[serde(rename = "Entradas Vendidas", alias = "tickets_sold")]
    pub tickets_sold: u32,
    #[serde(rename = "Ubicación", alias = "city")]
    pub city: String,
    /// Kept as text; numeric coercion happens per aggregation.
    #[serde(rename = "Satisfacción", alias = "satisfaction", default)]
    pub satisfaction: String,
    #[serde(rename = "Total", alias = "total")]
    pub total: f64,
    #[serde(rename = "Descuento", alias = "discount")]
    pub discount: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRow {
    #[serde(rename = "Fecha", alias = "date", deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
    #[serde(rename = "ID Usuario", alias = "user_id")]
    pub user_id: String,
    #[serde(rename = "Tiempo de Visualización", alias = "view_duration_secs")]
    pub view_duration_secs: u32,
    #[serde(rename = "Ubicación", alias = "city")]
    pub city: String,
}

/// Accepts a bare date or a midnight timestamp as written by spreadsheet tools.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
                .ok()
                .map(|dt| dt.date())
        })
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date '{raw}'")))
}

impl From<SalesRow> for SalesRecord {
    fn from(row: SalesRow) -> Self {
        SalesRecord {
            date: row.date,
            event: row.event,
            category: row.category,
            city: row.city,
            tickets_sold: row.tickets_sold,
            satisfaction: row.satisfaction,
            total: row.total,
            discount: row.discount,
        }
    }
}

impl From<&SalesRecord> for SalesRow {
    fn from(record: &SalesRecord) -> Self {
        SalesRow {
            date: record.date,
            event: record.event.clone(),
            category: record.category.clone(),
            tickets_sold: record.tickets_sold,
            city: record.city.clone(),
            satisfaction: record.satisfaction.clone(),
            total: record.total,
            discount: record.discount,
        }
    }
}

impl From<ViewRow> for ViewRecord {
    fn from(row: ViewRow) -> Self {
        ViewRecord {
            date: row.date,
            user_id: row.user_id,
            view_duration_secs: row.view_duration_secs,
            city: row.city,
        }
    }
}

impl From<&ViewRecord> for ViewRow {
    fn from(record: &ViewRecord) -> Self {
        ViewRow {
            date: record.date,
            user_id: record.user_id.clone(),
            view_duration_secs: record.view_duration_secs,
            city: record.city.clone(),
        }
    }
}
