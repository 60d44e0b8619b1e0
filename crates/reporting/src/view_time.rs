//! Total viewing time per day.

use crate::context::DataContext;
use crate::filter::DateWindow;
use chrono::NaiveDate;
use event_metrics_core::types::{fields, AggregationResult, MetricKind, SeriesRow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

pub const UNIT_SECONDS: &str = "seconds";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct ViewTimeParams {
    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub end_date: NaiveDate,
}

impl ViewTimeParams {
    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.start_date, self.end_date)
    }
}

pub fn view_time(ctx: &DataContext, params: &ViewTimeParams) -> AggregationResult {
    let window = params.window();
    let mut per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for view in ctx.views().iter().filter(|v| window.contains(v.date)) {
        *per_day.entry(view.date).or_default() += u64::from(view.view_duration_secs);
    }

    let rows = per_day
        .into_iter()
        .map(|(date, secs)| SeriesRow::new(date).with_value(fields::VIEW_DURATION, secs as f64))
        .collect();

    AggregationResult::line(MetricKind::ViewTime, fields::DATE, fields::VIEW_DURATION)
        .with_unit(UNIT_SECONDS)
        .with_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, view};

    #[test]
    fn test_sums_duration_per_day_across_cities() {
        let ctx = DataContext::new(
            Vec::new(),
            vec![
                view("2024-06-01", "Quito", 120),
                view("2024-06-01", "Manta", 30),
                view("2024-06-03", "Quito", 45),
                view("2024-07-01", "Quito", 999),
            ],
        );
        let result = view_time(
            &ctx,
            &ViewTimeParams {
                start_date: date("2024-06-01"),
                end_date: date("2024-06-30"),
            },
        );

        assert_eq!(result.unit.as_deref(), Some("seconds"));
        assert!(result.group_field.is_none());
        assert!(result.y_axis_clamp.is_none());
        assert_eq!(result.y_values(), vec![150.0, 45.0]);
        assert_eq!(result.rows[1].x.as_date(), Some(date("2024-06-03")));
    }

    #[test]
    fn test_empty_window_yields_no_rows() {
        let ctx = DataContext::new(Vec::new(), vec![view("2024-06-01", "Quito", 120)]);
        let result = view_time(
            &ctx,
            &ViewTimeParams {
                start_date: date("2024-06-02"),
                end_date: date("2024-06-01"),
            },
        );
        assert!(result.is_empty());
    }
}
