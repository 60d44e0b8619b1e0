use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Names of the numeric and axis fields carried by [`SeriesRow`]s.
pub mod fields {
    pub const DATE: &str = "date";
    pub const CITY: &str = "city";
    pub const CATEGORY: &str = "category";
    pub const EVENT: &str = "event";
    pub const TICKETS_SOLD: &str = "tickets_sold";
    pub const VIEW_COUNT: &str = "view_count";
    pub const CONVERSION_RATE: &str = "conversion_rate";
    pub const PROFITABILITY_INDEX: &str = "profitability_index";
    pub const SATISFACTION: &str = "satisfaction";
    pub const VIEW_DURATION: &str = "view_duration";
}

/// One row of the Sales table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SalesRecord {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub event: String,
    pub category: String,
    pub city: String,
    pub tickets_sold: u32,
    /// Raw rating text as delivered upstream; nominal domain is 1 to 5.
    pub satisfaction: String,
    pub total: f64,
    pub discount: f64,
}

impl SalesRecord {
    /// Numeric satisfaction, or `None` when the raw text is not a finite number.
    pub fn satisfaction_score(&self) -> Option<f64> {
        let value: f64 = self.satisfaction.trim().parse().ok()?;
        value.is_finite().then_some(value)
    }

    pub fn gross_margin(&self) -> f64 {
        self.total - self.discount
    }

    /// Gross margin over total. Undefined (`None`) for a zero total.
    pub fn profitability_index(&self) -> Option<f64> {
        if self.total == 0.0 {
            return None;
        }
        let index = self.gross_margin() / self.total;
        index.is_finite().then_some(index)
    }
}

/// One row of the Views table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ViewRecord {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub user_id: String,
    pub view_duration_secs: u32,
    pub city: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    ConversionRate,
    ProfitabilityIndex,
    Satisfaction,
    ViewTime,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::ConversionRate => "conversion_rate",
            MetricKind::ProfitabilityIndex => "profitability_index",
            MetricKind::Satisfaction => "satisfaction",
            MetricKind::ViewTime => "view_time",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
}

/// Fixed display range for the y axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    /// Nominal rating scale used by the satisfaction charts.
    pub const SATISFACTION: AxisRange = AxisRange { min: 1.0, max: 5.0 };
}

/// Primary (x axis) value of an output row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValue {
    Date(NaiveDate),
    Label(String),
}

impl AxisValue {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            AxisValue::Date(date) => Some(*date),
            AxisValue::Label(_) => None,
        }
    }

    pub fn as_label(&self) -> Option<&str> {
        match self {
            AxisValue::Label(label) => Some(label),
            AxisValue::Date(_) => None,
        }
    }
}

impl From<NaiveDate> for AxisValue {
    fn from(date: NaiveDate) -> Self {
        AxisValue::Date(date)
    }
}

impl From<String> for AxisValue {
    fn from(label: String) -> Self {
        AxisValue::Label(label)
    }
}

/// One output record of an aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SeriesRow {
    #[schema(value_type = String)]
    pub x: AxisValue,
    /// Secondary grouping value (one chart series per distinct value).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub values: BTreeMap<String, f64>,
    /// Display text attached to the mark (bar annotations).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl SeriesRow {
    pub fn new(x: impl Into<AxisValue>) -> Self {
        Self {
            x: x.into(),
            group: None,
            values: BTreeMap::new(),
            label: None,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_value(mut self, field: &str, value: f64) -> Self {
        self.values.insert(field.to_string(), value);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn value(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }
}

/// A ready-to-plot result handed to the chart renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AggregationResult {
    pub metric: MetricKind,
    pub chart_kind: ChartKind,
    pub x_field: String,
    pub y_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_axis_clamp: Option<AxisRange>,
    pub rows: Vec<SeriesRow>,
}

impl AggregationResult {
    pub fn new(metric: MetricKind, chart_kind: ChartKind, x_field: &str, y_field: &str) -> Self {
        Self {
            metric,
            chart_kind,
            x_field: x_field.to_string(),
            y_field: y_field.to_string(),
            group_field: None,
            unit: None,
            y_axis_clamp: None,
            rows: Vec::new(),
        }
    }

    pub fn line(metric: MetricKind, x_field: &str, y_field: &str) -> Self {
        Self::new(metric, ChartKind::Line, x_field, y_field)
    }

    pub fn bar(metric: MetricKind, x_field: &str, y_field: &str) -> Self {
        Self::new(metric, ChartKind::Bar, x_field, y_field)
    }

    pub fn grouped_by(mut self, field: &str) -> Self {
        self.group_field = Some(field.to_string());
        self
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    pub fn with_y_axis_clamp(mut self, range: AxisRange) -> Self {
        self.y_axis_clamp = Some(range);
        self
    }

    pub fn with_rows(mut self, rows: Vec<SeriesRow>) -> Self {
        self.rows = rows;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Plotted value of each row, in row order.
    pub fn y_values(&self) -> Vec<f64> {
        self.rows
            .iter()
            .filter_map(|row| row.value(&self.y_field))
            .collect()
    }
}
