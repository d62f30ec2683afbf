pub mod backend;
pub mod http;
pub mod log;

pub use backend::{MetricsBackend, NoopMetrics};
pub use http::HttpMetrics;
pub use log::LogMetrics;

use chrono::NaiveDate;
use serde::Serialize;

use highfive_common::HighFive;

pub const TOTAL_HIGH_FIVES: &str = "TotalHighFives";
pub const MOST_RECENT_AGE_DAYS: &str = "MostRecentHighFiveAgeDays";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetricUnit {
    Count,
    Days,
}

/// One named value, tagged with the namespace and environment it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDatum {
    pub namespace: String,
    pub environment: String,
    pub name: String,
    pub value: f64,
    pub unit: MetricUnit,
}

/// What a run reports to the metrics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    /// Age of the first high five in feed order; `None` when the feed is
    /// empty or that post has no date.
    pub most_recent_age_days: Option<i64>,
}

impl RunSummary {
    /// The feed is newest-first, so the first entry is taken as the most
    /// recent without re-sorting.
    pub fn new(high_fives: &[HighFive], today: NaiveDate) -> Self {
        Self {
            total: high_fives.len(),
            most_recent_age_days: high_fives.first().and_then(|hf| hf.age_in_days(today)),
        }
    }

    pub fn metrics(&self, namespace: &str, environment: &str) -> Vec<MetricDatum> {
        let datum = |name: &str, value: f64, unit: MetricUnit| MetricDatum {
            namespace: namespace.to_string(),
            environment: environment.to_string(),
            name: name.to_string(),
            value,
            unit,
        };

        let mut data = vec![datum(TOTAL_HIGH_FIVES, self.total as f64, MetricUnit::Count)];
        if let Some(age) = self.most_recent_age_days {
            data.push(datum(MOST_RECENT_AGE_DAYS, age as f64, MetricUnit::Days));
        }
        data
    }
}
