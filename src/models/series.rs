// Labeled time series as returned by the query API, and the normalized shape the
// histogram pipeline consumes.

use std::collections::HashMap;

use serde::Deserialize;

use super::BucketBoundary;

/// One series straight off the wire: its label set and the sample column.
#[derive(Debug, Clone, Default)]
pub struct RawSeries {
    pub labels: HashMap<String, String>,
    pub samples: Vec<f64>,
}

/// Which labels carry the group key, the bucket bound and the contributing host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SeriesLabels {
    pub group: String,
    pub bucket: String,
    pub host: String,
}

impl Default for SeriesLabels {
    fn default() -> Self {
        Self {
            group: "agent_tag_mzone_name".into(),
            bucket: "le".into(),
            host: "host_hostname".into(),
        }
    }
}

/// One host/bucket series over the queried window, samples in chronological order.
#[derive(Debug, Clone)]
pub struct Series {
    pub group: String,
    pub bucket: BucketBoundary,
    pub host: String,
    pub samples: Vec<f64>,
}

impl Series {
    pub fn new(
        group: impl Into<String>,
        bucket: &str,
        host: impl Into<String>,
        samples: Vec<f64>,
    ) -> Self {
        Self {
            group: group.into(),
            bucket: BucketBoundary::parse(bucket),
            host: host.into(),
            samples,
        }
    }

    /// Normalizes a raw series. Returns None when there are no samples or the group label
    /// is missing/empty. A missing bucket label is read as the unbounded bucket, a missing
    /// host label as the empty host.
    pub fn from_raw(raw: RawSeries, labels: &SeriesLabels) -> Option<Self> {
        if raw.samples.is_empty() {
            return None;
        }
        let mut map = raw.labels;
        let group = map.remove(&labels.group).filter(|g| !g.is_empty())?;
        let bucket = map
            .remove(&labels.bucket)
            .map(BucketBoundary::parse)
            .unwrap_or_else(BucketBoundary::unbounded);
        let host = map.remove(&labels.host).unwrap_or_default();
        Some(Self {
            group,
            bucket,
            host,
            samples: raw.samples,
        })
    }
}

/// Normalizes a batch, dropping series `Series::from_raw` rejects.
pub fn normalize(raw: Vec<RawSeries>, labels: &SeriesLabels) -> Vec<Series> {
    let total = raw.len();
    let out: Vec<Series> = raw
        .into_iter()
        .filter_map(|r| Series::from_raw(r, labels))
        .collect();
    if out.len() < total {
        tracing::debug!(
            skipped = total - out.len(),
            total,
            "dropped series without samples or group label"
        );
    }
    out
}
