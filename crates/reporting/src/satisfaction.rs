//! Mean customer satisfaction per event, city or day.
//!
//! Ratings arrive as raw text. Rows whose rating is not a finite number are
//! left out of this aggregation only; the shared tables are untouched.

use crate::context::DataContext;
use crate::filter::{selected, Mean};
use event_metrics_core::types::{
    fields, AggregationResult, AxisRange, AxisValue, MetricKind, SalesRecord, SeriesRow,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SatisfactionMode {
    /// Split each event (or day) by a second key.
    CompareByEvent,
    #[default]
    General,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct SatisfactionParams {
    #[schema(value_type = Vec<String>)]
    pub events: BTreeSet<String>,
    #[schema(value_type = Vec<String>)]
    pub cities: BTreeSet<String>,
    #[serde(default)]
    pub mode: SatisfactionMode,
    #[serde(default)]
    pub temporal: bool,
}

/// Grouping key of one output row: primary axis value plus optional series.
type GroupKey = (AxisValue, Option<String>);

pub fn satisfaction(ctx: &DataContext, params: &SatisfactionParams) -> AggregationResult {
    let compare = params.mode == SatisfactionMode::CompareByEvent;
    let result = if params.temporal {
        AggregationResult::line(MetricKind::Satisfaction, fields::DATE, fields::SATISFACTION)
    } else {
        AggregationResult::bar(MetricKind::Satisfaction, fields::EVENT, fields::SATISFACTION)
    };
    let result = match (params.temporal, compare) {
        (false, true) => result.grouped_by(fields::CITY),
        (true, true) => result.grouped_by(fields::EVENT),
        (_, false) => result,
    }
    .with_y_axis_clamp(AxisRange::SATISFACTION);

    if params.events.is_empty() || params.cities.is_empty() {
        return result;
    }

    let key_of: fn(&SalesRecord) -> GroupKey = match (params.temporal, compare) {
        (false, true) => |s| (AxisValue::Label(s.event.clone()), Some(s.city.clone())),
        (false, false) => |s| (AxisValue::Label(s.event.clone()), None),
        (true, true) => |s| (AxisValue::Date(s.date), Some(s.event.clone())),
        (true, false) => |s| (AxisValue::Date(s.date), None),
    };

    let mut dropped = 0u64;
    let mut groups: BTreeMap<GroupKey, Mean> = BTreeMap::new();
    for sale in ctx
        .sales()
        .iter()
        .filter(|s| selected(&params.events, &s.event) && selected(&params.cities, &s.city))
    {
        match sale.satisfaction_score() {
            Some(score) => groups.entry(key_of(sale)).or_default().push(score),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(dropped, "Dropped sales rows with non-numeric satisfaction");
        metrics::counter!("aggregation.satisfaction_coerce_dropped").increment(dropped);
    }

    let rows = groups
        .into_iter()
        .filter_map(|((x, group), mean)| {
            let value = mean.value()?;
            let row = SeriesRow::new(x).with_value(fields::SATISFACTION, value);
            Some(match group {
                Some(group) => row.with_group(group),
                None => row,
            })
        })
        .collect();
    result.with_rows(rows)
}
