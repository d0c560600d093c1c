// Cross-series fold: sum contributions per (group, bucket) and track host coverage.

use std::collections::BTreeMap;

use crate::models::{BucketBoundary, HostCoverage, Series};

use super::reset::{Contribution, SampleMode};

/// Summed cumulative value for one (group, bucket) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedValue {
    pub group: String,
    pub bucket: BucketBoundary,
    pub value: f64,
}

#[derive(Debug, Default)]
pub struct GroupAggregator {
    mode: SampleMode,
    sums: BTreeMap<(String, BucketBoundary), f64>,
    coverage: HostCoverage,
    counter_resets: usize,
}

impl GroupAggregator {
    pub fn new(mode: SampleMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn add(&mut self, series: &Series) {
        match Contribution::of(&series.samples, self.mode) {
            Contribution::Empty => {}
            Contribution::CounterReset { first, last } => {
                tracing::debug!(
                    group = %series.group,
                    host = %series.host,
                    le = %series.bucket,
                    first,
                    last,
                    "counter reset in window, series excluded"
                );
                self.counter_resets += 1;
                self.coverage.record_invalid(&series.group, &series.host);
            }
            Contribution::Valid(delta) => {
                self.coverage.record(&series.group, &series.host);
                *self
                    .sums
                    .entry((series.group.clone(), series.bucket.clone()))
                    .or_insert(0.0) += delta;
            }
        }
    }

    pub fn coverage(&self) -> &HostCoverage {
        &self.coverage
    }

    pub fn counter_resets(&self) -> usize {
        self.counter_resets
    }

    /// Consumes the fold. Values come out ordered by (group, bucket).
    pub fn finish(self) -> (Vec<AggregatedValue>, HostCoverage) {
        let values = self
            .sums
            .into_iter()
            .map(|((group, bucket), value)| AggregatedValue {
                group,
                bucket,
                value,
            })
            .collect();
        (values, self.coverage)
    }
}
