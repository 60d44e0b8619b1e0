//! Immutable reference tables and the snapshot store that shares them.
//!
//! Every aggregation reads one [`ContextSnapshot`]. A reload builds a fresh
//! [`DataContext`] and swaps the whole snapshot, so an aggregation already
//! in flight keeps reading the tables it started with.

use crate::filter::DateWindow;
use event_metrics_core::types::{SalesRecord, ViewRecord};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

/// The Sales and Views tables, loaded once.
#[derive(Debug, Clone, Default)]
pub struct DataContext {
    sales: Vec<SalesRecord>,
    views: Vec<ViewRecord>,
}

impl DataContext {
    pub fn new(sales: Vec<SalesRecord>, views: Vec<ViewRecord>) -> Self {
        Self { sales, views }
    }

    pub fn sales(&self) -> &[SalesRecord] {
        &self.sales
    }

    pub fn views(&self) -> &[ViewRecord] {
        &self.views
    }

    /// Distinct values offered by the dashboard filter controls.
    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            cities: distinct_values(&self.sales, |s| &s.city),
            categories: distinct_values(&self.sales, |s| &s.category),
            events: distinct_values(&self.sales, |s| &s.event),
            sales_dates: DateWindow::spanning(self.sales.iter().map(|s| s.date)),
            view_dates: DateWindow::spanning(self.views.iter().map(|v| v.date)),
        }
    }
}

fn distinct_values(sales: &[SalesRecord], key: fn(&SalesRecord) -> &str) -> Vec<String> {
    sales
        .iter()
        .map(key)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Choices for each filter control, sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FilterOptions {
    pub cities: Vec<String>,
    pub categories: Vec<String>,
    pub events: Vec<String>,
    pub sales_dates: Option<DateWindow>,
    pub view_dates: Option<DateWindow>,
}

/// One consistent version of the reference tables.
#[derive(Debug, Clone)]
pub struct ContextSnapshot {
    pub generation: u64,
    pub data: Arc<DataContext>,
}

/// Copy-on-write holder of the current [`ContextSnapshot`].
pub struct SharedContext {
    current: RwLock<ContextSnapshot>,
}

impl SharedContext {
    pub fn new(data: DataContext) -> Self {
        info!(
            sales = data.sales.len(),
            views = data.views.len(),
            "Reference tables installed"
        );
        Self {
            current: RwLock::new(ContextSnapshot {
                generation: 1,
                data: Arc::new(data),
            }),
        }
    }

    pub fn snapshot(&self) -> ContextSnapshot {
        self.current.read().clone()
    }

    pub fn generation(&self) -> u64 {
        self.current.read().generation
    }

    /// Install new tables and return the new generation.
    pub fn replace(&self, data: DataContext) -> u64 {
        let sales = data.sales.len();
        let views = data.views.len();
        let mut current = self.current.write();
        let generation = current.generation + 1;
        *current = ContextSnapshot {
            generation,
            data: Arc::new(data),
        };
        info!(generation, sales, views, "Reference tables replaced");
        generation
    }
}
