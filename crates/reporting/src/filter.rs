//! Row filters and grouping accumulators shared by the metric operations.

use chrono::NaiveDate;
use event_metrics_core::{MetricsError, MetricsResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use utoipa::ToSchema;

/// Inclusive calendar-date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct DateWindow {
    #[schema(value_type = String, format = Date)]
    pub start: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// True when `date` lies within `[start, end]`. A reversed window
    /// contains nothing.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_reversed(&self) -> bool {
        self.start > self.end
    }

    /// Boundary check for callers that accept windows from users.
    pub fn validate(&self) -> MetricsResult<()> {
        if self.is_reversed() {
            return Err(MetricsError::InvalidQuery(format!(
                "start date {} is after end date {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// Smallest window covering every date yielded, or `None` for no dates.
    pub fn spanning(dates: impl IntoIterator<Item = NaiveDate>) -> Option<Self> {
        dates.into_iter().fold(None, |acc, date| match acc {
            None => Some(Self::new(date, date)),
            Some(w) => Some(Self::new(w.start.min(date), w.end.max(date))),
        })
    }
}

/// Membership test against a user selection. An empty selection matches nothing.
pub fn selected(selection: &BTreeSet<String>, value: &str) -> bool {
    selection.contains(value)
}

/// Running arithmetic mean.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mean {
    sum: f64,
    count: u64,
}

impl Mean {
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// `numerator / denominator`, undefined for a zero denominator.
pub fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    #[test]
    fn test_window_is_inclusive() {
        let window = DateWindow::new(d(1, 10), d(1, 20));
        assert!(window.contains(d(1, 10)));
        assert!(window.contains(d(1, 20)));
        assert!(!window.contains(d(1, 9)));
        assert!(!window.contains(d(1, 21)));
    }

    #[test]
    fn test_reversed_window_contains_nothing() {
        let window = DateWindow::new(d(2, 1), d(1, 1));
        assert!(window.is_reversed());
        assert!(!window.contains(d(1, 15)));
        assert!(matches!(window.validate(), Err(MetricsError::InvalidQuery(_))));
    }

    #[test]
    fn test_spanning() {
        let window = DateWindow::spanning(vec![d(3, 5), d(1, 2), d(7, 30)]).unwrap();
        assert_eq!(window, DateWindow::new(d(1, 2), d(7, 30)));
        assert!(DateWindow::spanning(Vec::new()).is_none());
    }

    #[test]
    fn test_mean_and_ratio() {
        let mut mean = Mean::default();
        assert_eq!(mean.value(), None);
        mean.push(2.0);
        mean.push(4.0);
        assert_eq!(mean.value(), Some(3.0));
        assert_eq!(mean.count(), 2);

        assert_eq!(ratio(11, 25), Some(0.44));
        assert_eq!(ratio(3, 0), None);
    }

    #[test]
    fn test_empty_selection_matches_nothing() {
        let selection = BTreeSet::new();
        assert!(!selected(&selection, "Quito"));
    }
}
