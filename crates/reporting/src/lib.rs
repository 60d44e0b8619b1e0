//! Event-sales metrics aggregation: conversion rate, profitability index,
//! customer satisfaction and view-time, computed from the Sales and Views
//! reference tables.

pub mod context;
pub mod conversion;
pub mod engine;
pub mod filter;
pub mod profitability;
pub mod query;
pub mod satisfaction;
pub mod view_time;

pub use context::{DataContext, FilterOptions, SharedContext};
pub use conversion::{ConversionMode, ConversionParams};
pub use engine::AggregationEngine;
pub use filter::DateWindow;
pub use profitability::ProfitabilityParams;
pub use query::{DefaultQueries, MetricQuery};
pub use satisfaction::{SatisfactionMode, SatisfactionParams};
pub use view_time::ViewTimeParams;
