//! Aggregation engine. Runs metric queries against the current snapshot of
//! the reference tables and memoizes the results.

use crate::context::{DataContext, FilterOptions, SharedContext};
use crate::conversion::ConversionParams;
use crate::profitability::ProfitabilityParams;
use crate::query::{DefaultQueries, MetricQuery};
use crate::satisfaction::SatisfactionParams;
use crate::view_time::ViewTimeParams;
use dashmap::DashMap;
use event_metrics_core::types::AggregationResult;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Cache key: results are only valid for the snapshot they were computed on.
type CacheKey = (u64, MetricQuery);

pub struct AggregationEngine {
    context: SharedContext,
    cache: DashMap<CacheKey, Arc<AggregationResult>>,
    cache_capacity: usize,
}

impl AggregationEngine {
    pub fn new(data: DataContext, cache_capacity: usize) -> Self {
        info!(cache_capacity, "Aggregation engine initialized");
        Self {
            context: SharedContext::new(data),
            cache: DashMap::new(),
            cache_capacity,
        }
    }

    /// Evaluate a query. Identical queries against the same snapshot return
    /// the same result.
    pub fn run(&self, query: &MetricQuery) -> Arc<AggregationResult> {
        let metric = query.metric().as_str();
        metrics::counter!("aggregation.requests", "metric" => metric).increment(1);

        let snapshot = self.context.snapshot();
        let key = (snapshot.generation, query.clone());
        if let Some(hit) = self.cache.get(&key) {
            metrics::counter!("aggregation.cache_hits", "metric" => metric).increment(1);
            return hit.value().clone();
        }

        let started = Instant::now();
        let result = Arc::new(query.evaluate(&snapshot.data));
        let elapsed_us = started.elapsed().as_micros() as f64;
        metrics::histogram!("aggregation.latency_us", "metric" => metric).record(elapsed_us);
        debug!(
            metric,
            generation = snapshot.generation,
            rows = result.rows.len(),
            elapsed_us,
            "Aggregation computed"
        );

        self.remember(key, result.clone());
        result
    }

    fn remember(&self, key: CacheKey, result: Arc<AggregationResult>) {
        let current = self.context.generation();
        // Tables were swapped while this result was computed.
        if self.cache_capacity == 0 || key.0 != current {
            return;
        }
        if self.cache.len() >= self.cache_capacity {
            self.cache.retain(|(g, _), _| *g == current);
            if self.cache.len() >= self.cache_capacity {
                self.cache.clear();
            }
        }
        self.cache.insert(key, result);
    }

    pub fn conversion_rate(&self, params: &ConversionParams) -> Arc<AggregationResult> {
        self.run(&MetricQuery::ConversionRate(params.clone()))
    }

    pub fn profitability_index(&self, params: &ProfitabilityParams) -> Arc<AggregationResult> {
        self.run(&MetricQuery::ProfitabilityIndex(params.clone()))
    }

    pub fn satisfaction(&self, params: &SatisfactionParams) -> Arc<AggregationResult> {
        self.run(&MetricQuery::Satisfaction(params.clone()))
    }

    pub fn view_time(&self, params: &ViewTimeParams) -> Arc<AggregationResult> {
        self.run(&MetricQuery::ViewTime(*params))
    }

    pub fn filter_options(&self) -> FilterOptions {
        self.context.snapshot().data.filter_options()
    }

    pub fn default_queries(&self) -> DefaultQueries {
        DefaultQueries::from_options(&self.filter_options())
    }

    /// Swap in freshly loaded tables. Aggregations already running finish on
    /// the tables they started with.
    pub fn reload(&self, data: DataContext) -> u64 {
        let generation = self.context.replace(data);
        self.cache.clear();
        generation
    }

    pub fn generation(&self) -> u64 {
        self.context.generation()
    }

    pub fn cached_results(&self) -> usize {
        self.cache.len()
    }
}
