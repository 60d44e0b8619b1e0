//! Tagged query type covering every metric operation, plus the initial
//! dashboard queries derived from the available filter options.

use crate::context::{DataContext, FilterOptions};
use crate::conversion::{conversion_rate, ConversionMode, ConversionParams};
use crate::profitability::{profitability_index, ProfitabilityParams};
use crate::satisfaction::{satisfaction, SatisfactionMode, SatisfactionParams};
use crate::view_time::{view_time, ViewTimeParams};
use event_metrics_core::types::{AggregationResult, MetricKind};
use event_metrics_core::MetricsResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "metric", rename_all = "snake_case")]
pub enum MetricQuery {
    ConversionRate(ConversionParams),
    ProfitabilityIndex(ProfitabilityParams),
    Satisfaction(SatisfactionParams),
    ViewTime(ViewTimeParams),
}

impl MetricQuery {
    pub fn metric(&self) -> MetricKind {
        match self {
            MetricQuery::ConversionRate(_) => MetricKind::ConversionRate,
            MetricQuery::ProfitabilityIndex(_) => MetricKind::ProfitabilityIndex,
            MetricQuery::Satisfaction(_) => MetricKind::Satisfaction,
            MetricQuery::ViewTime(_) => MetricKind::ViewTime,
        }
    }

    /// Reject parameter sets a UI should never send. The operations
    /// themselves accept anything and return an empty result instead.
    pub fn validate(&self) -> MetricsResult<()> {
        match self {
            MetricQuery::ConversionRate(p) => p.window().validate(),
            MetricQuery::ViewTime(p) => p.window().validate(),
            MetricQuery::ProfitabilityIndex(_) | MetricQuery::Satisfaction(_) => Ok(()),
        }
    }

    pub fn evaluate(&self, ctx: &DataContext) -> AggregationResult {
        match self {
            MetricQuery::ConversionRate(p) => conversion_rate(ctx, p),
            MetricQuery::ProfitabilityIndex(p) => profitability_index(ctx, p),
            MetricQuery::Satisfaction(p) => satisfaction(ctx, p),
            MetricQuery::ViewTime(p) => view_time(ctx, p),
        }
    }
}

/// Queries the dashboard issues before the user touches any control:
/// every option selected and the full date range of the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DefaultQueries {
    pub conversion_rate: Option<ConversionParams>,
    pub profitability_index: ProfitabilityParams,
    pub satisfaction: SatisfactionParams,
    pub view_time: Option<ViewTimeParams>,
}

impl DefaultQueries {
    pub fn from_options(options: &FilterOptions) -> Self {
        let conversion_rate = options.sales_dates.map(|window| ConversionParams {
            start_date: window.start,
            end_date: window.end,
            cities: options.cities.iter().cloned().collect(),
            mode: ConversionMode::All,
        });
        let view_time = options
            .view_dates
            .or(options.sales_dates)
            .map(|window| ViewTimeParams {
                start_date: window.start,
                end_date: window.end,
            });

        Self {
            conversion_rate,
            profitability_index: ProfitabilityParams {
                categories: options.categories.iter().cloned().collect(),
                cities: options.cities.iter().cloned().collect(),
                temporal: true,
            },
            satisfaction: SatisfactionParams {
                events: options.events.iter().cloned().collect(),
                cities: options.cities.iter().cloned().collect(),
                mode: SatisfactionMode::General,
                temporal: false,
            },
            view_time,
        }
    }

    /// The defaults as runnable queries, skipping those without a date range.
    pub fn queries(&self) -> Vec<MetricQuery> {
        let mut queries = Vec::with_capacity(4);
        if let Some(p) = &self.conversion_rate {
            queries.push(MetricQuery::ConversionRate(p.clone()));
        }
        queries.push(MetricQuery::ProfitabilityIndex(self.profitability_index.clone()));
        queries.push(MetricQuery::Satisfaction(self.satisfaction.clone()));
        if let Some(p) = self.view_time {
            queries.push(MetricQuery::ViewTime(p));
        }
        queries
    }
}
