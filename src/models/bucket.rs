// Histogram bucket boundaries (the `le` label) and decumulated output rows.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Label Prometheus uses for the catch-all bucket.
pub const UNBOUNDED_LABEL: &str = "+Inf";

/// Parsed upper bound of a bucket. Ordering: finite bounds ascending, then labels that
/// are not numbers, then the unbounded bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Finite(f64),
    Unparsed,
    Unbounded,
}

impl Bound {
    fn rank(&self) -> u8 {
        match self {
            Bound::Finite(_) => 0,
            Bound::Unparsed => 1,
            Bound::Unbounded => 2,
        }
    }
}

/// A bucket boundary: the raw label as reported plus its parsed bound.
/// Identity (Eq/Hash) is the label string; ordering is numeric with the label as tie-break.
#[derive(Debug, Clone)]
pub struct BucketBoundary {
    label: String,
    bound: Bound,
}

impl BucketBoundary {
    pub fn parse(label: impl Into<String>) -> Self {
        let label = label.into();
        let bound = match label.trim().parse::<f64>() {
            Ok(v) if v.is_infinite() && v.is_sign_positive() => Bound::Unbounded,
            Ok(v) if v.is_nan() => Bound::Unparsed,
            Ok(v) => Bound::Finite(v),
            Err(_) => Bound::Unparsed,
        };
        Self { label, bound }
    }

    pub fn unbounded() -> Self {
        Self {
            label: UNBOUNDED_LABEL.to_string(),
            bound: Bound::Unbounded,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn bound(&self) -> Bound {
        self.bound
    }

    pub fn is_unbounded(&self) -> bool {
        self.bound == Bound::Unbounded
    }
}

impl PartialEq for BucketBoundary {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
    }
}

impl Eq for BucketBoundary {}

impl Hash for BucketBoundary {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.label.hash(state);
    }
}

impl Ord for BucketBoundary {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_bound = match (self.bound, other.bound) {
            (Bound::Finite(a), Bound::Finite(b)) => a.total_cmp(&b),
            (a, b) => a.rank().cmp(&b.rank()),
        };
        // "1" and "1.0" parse equal but are distinct buckets
        by_bound.then_with(|| self.label.cmp(&other.label))
    }
}

impl PartialOrd for BucketBoundary {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BucketBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// One output row: per-bucket (non-cumulative) value for a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketRow {
    pub group: String,
    pub le: String,
    pub value: f64,
}
