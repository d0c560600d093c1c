// Histogram reconstruction: per-series reset check, per-group fold, per-bucket differencing.
// Pure and synchronous; fetching and report writing live in grafana/ and report/.

mod aggregate;
mod decumulate;
mod reset;

pub use aggregate::{AggregatedValue, GroupAggregator};
pub use decumulate::decumulate;
pub use reset::{Contribution, SampleMode};

use crate::models::{BucketRow, HostCoverage, Series};

/// Decumulated rows for one metric plus who contributed to them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistogramReport {
    /// Ordered by group, then bucket bound (unbounded last).
    pub rows: Vec<BucketRow>,
    pub coverage: HostCoverage,
    /// Number of series excluded because their counter went down over the window.
    pub counter_resets: usize,
}

impl HistogramReport {
    /// No rows means nothing to report for this metric.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Window mode: `aggregate_and_decumulate_with(series, SampleMode::Window)`.
pub fn aggregate_and_decumulate(series: &[Series]) -> HistogramReport {
    aggregate_and_decumulate_with(series, SampleMode::Window)
}

pub fn aggregate_and_decumulate_with(series: &[Series], mode: SampleMode) -> HistogramReport {
    let mut aggregator = GroupAggregator::new(mode);
    for s in series {
        aggregator.add(s);
    }
    let counter_resets = aggregator.counter_resets();
    let (values, coverage) = aggregator.finish();
    coverage.log_summary();
    HistogramReport {
        rows: decumulate(values),
        coverage,
        counter_resets,
    }
}
