//! Sales conversion rate: tickets sold per page view, by day and city.
//!
//! Views are filtered by date only, never by city: the denominator of every
//! day/city pair counts all views recorded for that pair in the window,
//! whatever cities the caller selected. Pairs missing from either side are
//! dropped (inner join), which undercounts when view data lags sales data.

use crate::context::DataContext;
use crate::filter::{ratio, selected, DateWindow};
use chrono::NaiveDate;
use event_metrics_core::types::{fields, AggregationResult, MetricKind, SeriesRow};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMode {
    /// One series: tickets and views summed across cities before dividing.
    #[default]
    All,
    /// One series per city.
    ByCity,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct ConversionParams {
    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub end_date: NaiveDate,
    #[schema(value_type = Vec<String>)]
    pub cities: BTreeSet<String>,
    #[serde(default)]
    pub mode: ConversionMode,
}

impl ConversionParams {
    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.start_date, self.end_date)
    }
}

/// A day/city pair present in both grouped tables.
#[derive(Debug, Clone, Copy, PartialEq)]
struct JoinedPair {
    tickets_sold: u64,
    view_count: u64,
}

pub fn conversion_rate(ctx: &DataContext, params: &ConversionParams) -> AggregationResult {
    let result = AggregationResult::line(
        MetricKind::ConversionRate,
        fields::DATE,
        fields::CONVERSION_RATE,
    );
    let result = match params.mode {
        ConversionMode::ByCity => result.grouped_by(fields::CITY),
        ConversionMode::All => result,
    };

    if params.cities.is_empty() {
        return result;
    }

    let joined = join_day_city(ctx, params);
    let rows = match params.mode {
        ConversionMode::ByCity => by_city_rows(joined),
        ConversionMode::All => combined_rows(joined),
    };
    result.with_rows(rows)
}

fn join_day_city<'a>(
    ctx: &'a DataContext,
    params: &ConversionParams,
) -> BTreeMap<(NaiveDate, &'a str), JoinedPair> {
    let window = params.window();

    let mut tickets: BTreeMap<(NaiveDate, &str), u64> = BTreeMap::new();
    for sale in ctx
        .sales()
        .iter()
        .filter(|s| window.contains(s.date) && selected(&params.cities, &s.city))
    {
        *tickets.entry((sale.date, sale.city.as_str())).or_default() += u64::from(sale.tickets_sold);
    }

    let mut views: HashMap<(NaiveDate, &str), u64> = HashMap::new();
    for view in ctx.views().iter().filter(|v| window.contains(v.date)) {
        *views.entry((view.date, view.city.as_str())).or_default() += 1;
    }

    let sales_pairs = tickets.len();
    let joined: BTreeMap<_, _> = tickets
        .into_iter()
        .filter_map(|(key, tickets_sold)| {
            let view_count = views.get(&key).copied()?;
            Some((
                key,
                JoinedPair {
                    tickets_sold,
                    view_count,
                },
            ))
        })
        .collect();

    debug!(
        sales_pairs,
        view_pairs = views.len(),
        joined = joined.len(),
        "Joined sales and views by day and city"
    );
    joined
}

fn by_city_rows(joined: BTreeMap<(NaiveDate, &str), JoinedPair>) -> Vec<SeriesRow> {
    joined
        .into_iter()
        .filter_map(|((date, city), pair)| {
            let rate = ratio(pair.tickets_sold, pair.view_count)?;
            Some(
                SeriesRow::new(date)
                    .with_group(city)
                    .with_value(fields::TICKETS_SOLD, pair.tickets_sold as f64)
                    .with_value(fields::VIEW_COUNT, pair.view_count as f64)
                    .with_value(fields::CONVERSION_RATE, rate),
            )
        })
        .collect()
}

fn combined_rows(joined: BTreeMap<(NaiveDate, &str), JoinedPair>) -> Vec<SeriesRow> {
    let mut per_day: BTreeMap<NaiveDate, JoinedPair> = BTreeMap::new();
    for ((date, _), pair) in joined {
        let total = per_day.entry(date).or_insert(JoinedPair {
            tickets_sold: 0,
            view_count: 0,
        });
        total.tickets_sold += pair.tickets_sold;
        total.view_count += pair.view_count;
    }

    per_day
        .into_iter()
        .filter_map(|(date, total)| {
            let rate = ratio(total.tickets_sold, total.view_count)?;
            Some(
                SeriesRow::new(date)
                    .with_value(fields::TICKETS_SOLD, total.tickets_sold as f64)
                    .with_value(fields::VIEW_COUNT, total.view_count as f64)
                    .with_value(fields::CONVERSION_RATE, rate),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{date, sale, set, view, views};
    use event_metrics_core::types::ChartKind;

    fn params(mode: ConversionMode, selected: &[&str]) -> ConversionParams {
        ConversionParams {
            start_date: date("2024-01-01"),
            end_date: date("2024-12-31"),
            cities: set(selected),
            mode,
        }
    }

    fn two_city_day() -> DataContext {
        let mut all_views = views("2024-03-01", "A", 5);
        all_views.extend(views("2024-03-01", "B", 20));
        DataContext::new(
            vec![
                sale("2024-03-01", "Concierto A", "Música", "A", 10, "4", 50.0, 5.0),
                sale("2024-03-01", "Feria C", "Cultura", "B", 1, "4", 50.0, 5.0),
            ],
            all_views,
        )
    }

    #[test]
    fn test_all_mode_divides_summed_totals() {
        let result = conversion_rate(&two_city_day(), &params(ConversionMode::All, &["A", "B"]));

        assert_eq!(result.chart_kind, ChartKind::Line);
        assert!(result.group_field.is_none());
        assert_eq!(result.rows.len(), 1);
        let row = &result.rows[0];
        assert_eq!(row.value(fields::TICKETS_SOLD), Some(11.0));
        assert_eq!(row.value(fields::VIEW_COUNT), Some(25.0));
        // 11 / 25, not the mean of 2.0 and 0.05.
        assert_eq!(row.value(fields::CONVERSION_RATE), Some(0.44));
    }

    #[test]
    fn test_by_city_emits_one_series_per_city() {
        let result = conversion_rate(&two_city_day(), &params(ConversionMode::ByCity, &["A", "B"]));

        assert_eq!(result.group_field.as_deref(), Some("city"));
        let rates: Vec<_> = result
            .rows
            .iter()
            .map(|r| (r.group.clone().unwrap(), r.value(fields::CONVERSION_RATE).unwrap()))
            .collect();
        assert_eq!(rates, vec![("A".to_string(), 2.0), ("B".to_string(), 0.05)]);
    }

    #[test]
    fn test_tickets_are_summed_and_views_counted() {
        let ctx = DataContext::new(
            vec![
                sale("2024-03-01", "Concierto A", "Música", "A", 3, "4", 50.0, 5.0),
                sale("2024-03-01", "Feria C", "Cultura", "A", 4, "4", 50.0, 5.0),
            ],
            vec![view("2024-03-01", "A", 250), view("2024-03-01", "A", 1)],
        );
        let result = conversion_rate(&ctx, &params(ConversionMode::ByCity, &["A"]));
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].value(fields::VIEW_COUNT), Some(2.0));
        assert_eq!(result.rows[0].value(fields::CONVERSION_RATE), Some(3.5));
    }

    #[test]
    fn test_sales_without_matching_views_are_dropped() {
        let ctx = DataContext::new(
            vec![
                sale("2024-03-01", "Concierto A", "Música", "A", 10, "4", 50.0, 5.0),
                sale("2024-03-02", "Concierto A", "Música", "A", 10, "4", 50.0, 5.0),
            ],
            // Views exist on the second day, but only for another city.
            vec![view("2024-03-01", "A", 30), view("2024-03-02", "B", 30)],
        );

        let result = conversion_rate(&ctx, &params(ConversionMode::ByCity, &["A"]));
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].x.as_date(), Some(date("2024-03-01")));

        let combined = conversion_rate(&ctx, &params(ConversionMode::All, &["A"]));
        assert_eq!(combined.rows.len(), 1);
        assert_eq!(combined.rows[0].value(fields::CONVERSION_RATE), Some(10.0));
    }

    #[test]
    fn test_views_ignore_city_selection() {
        // B's views pass the date filter but find no selected sales to join.
        let result = conversion_rate(&two_city_day(), &params(ConversionMode::All, &["A"]));
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].value(fields::CONVERSION_RATE), Some(2.0));
    }

    #[test]
    fn test_date_window_is_inclusive_on_both_sides() {
        let mut all_views = views("2024-03-01", "A", 1);
        all_views.extend(views("2024-03-03", "A", 1));
        all_views.extend(views("2024-03-04", "A", 1));
        let ctx = DataContext::new(
            vec![
                sale("2024-03-01", "Concierto A", "Música", "A", 1, "4", 50.0, 5.0),
                sale("2024-03-03", "Concierto A", "Música", "A", 1, "4", 50.0, 5.0),
                sale("2024-03-04", "Concierto A", "Música", "A", 1, "4", 50.0, 5.0),
            ],
            all_views,
        );
        let mut p = params(ConversionMode::All, &["A"]);
        p.start_date = date("2024-03-01");
        p.end_date = date("2024-03-03");

        let dates: Vec<_> = conversion_rate(&ctx, &p)
            .rows
            .iter()
            .map(|r| r.x.as_date().unwrap())
            .collect();
        assert_eq!(dates, vec![date("2024-03-01"), date("2024-03-03")]);
    }

    #[test]
    fn test_empty_city_selection_returns_empty_series() {
        let result = conversion_rate(&two_city_day(), &params(ConversionMode::ByCity, &[]));
        assert!(result.is_empty());
        assert_eq!(result.group_field.as_deref(), Some("city"));
    }

    #[test]
    fn test_reversed_window_returns_empty_series() {
        let mut p = params(ConversionMode::All, &["A", "B"]);
        p.start_date = date("2024-12-31");
        p.end_date = date("2024-01-01");
        assert!(conversion_rate(&two_city_day(), &p).is_empty());
    }
}
