//! Profitability index: gross margin over total, averaged per category.

use crate::context::DataContext;
use crate::filter::{selected, Mean};
use chrono::NaiveDate;
use event_metrics_core::types::{fields, AggregationResult, MetricKind, SeriesRow};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct ProfitabilityParams {
    #[schema(value_type = Vec<String>)]
    pub categories: BTreeSet<String>,
    #[schema(value_type = Vec<String>)]
    pub cities: BTreeSet<String>,
    /// Line per category over time when set; one bar per category otherwise.
    #[serde(default = "default_temporal")]
    pub temporal: bool,
}

fn default_temporal() -> bool {
    true
}

pub fn profitability_index(ctx: &DataContext, params: &ProfitabilityParams) -> AggregationResult {
    let result = if params.temporal {
        AggregationResult::line(
            MetricKind::ProfitabilityIndex,
            fields::DATE,
            fields::PROFITABILITY_INDEX,
        )
        .grouped_by(fields::CATEGORY)
    } else {
        AggregationResult::bar(
            MetricKind::ProfitabilityIndex,
            fields::CATEGORY,
            fields::PROFITABILITY_INDEX,
        )
    };

    if params.categories.is_empty() || params.cities.is_empty() {
        return result;
    }

    let mut skipped = 0usize;
    let indexed = ctx
        .sales()
        .iter()
        .filter(|s| selected(&params.categories, &s.category) && selected(&params.cities, &s.city))
        .filter_map(|s| match s.profitability_index() {
            Some(index) => Some((s, index)),
            None => {
                skipped += 1;
                None
            }
        });

    let rows = if params.temporal {
        let mut groups: BTreeMap<(NaiveDate, &str), Mean> = BTreeMap::new();
        for (sale, index) in indexed {
            groups
                .entry((sale.date, sale.category.as_str()))
                .or_default()
                .push(index);
        }
        groups
            .into_iter()
            .filter_map(|((date, category), mean)| {
                let value = mean.value()?;
                Some(
                    SeriesRow::new(date)
                        .with_group(category)
                        .with_value(fields::PROFITABILITY_INDEX, value),
                )
            })
            .collect::<Vec<_>>()
    } else {
        let mut groups: BTreeMap<&str, Mean> = BTreeMap::new();
        for (sale, index) in indexed {
            groups.entry(sale.category.as_str()).or_default().push(index);
        }
        groups
            .into_iter()
            .filter_map(|(category, mean)| {
                let value = mean.value()?;
                Some(
                    SeriesRow::new(category.to_string())
                        .with_value(fields::PROFITABILITY_INDEX, value)
                        .with_label(format!("{value:.2}")),
                )
            })
            .collect::<Vec<_>>()
    };

    if skipped > 0 {
        debug!(skipped, "Skipped sales rows with zero total");
    }
    result.with_rows(rows)
}
