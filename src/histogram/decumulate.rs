// Cumulative buckets -> per-bucket values by successive differencing within each group.

use crate::models::BucketRow;

use super::aggregate::AggregatedValue;

/// Sorts by (group, bucket) with the unbounded bucket last in its group, then replaces
/// each value with its difference from the next-lower bucket of the same group. The
/// lowest bucket of every group keeps its cumulative value. Negative results are kept:
/// they mean the source histogram was inconsistent, not that something broke here.
pub fn decumulate(mut values: Vec<AggregatedValue>) -> Vec<BucketRow> {
    values.sort_by(|a, b| a.group.cmp(&b.group).then_with(|| a.bucket.cmp(&b.bucket)));

    let mut rows = Vec::with_capacity(values.len());
    let mut prev: Option<(&str, f64)> = None;
    for v in &values {
        let value = match prev {
            Some((group, cumulative)) if group == v.group => v.value - cumulative,
            _ => v.value,
        };
        prev = Some((v.group.as_str(), v.value));
        rows.push(BucketRow {
            group: v.group.clone(),
            le: v.bucket.label().to_string(),
            value,
        });
    }
    rows
}
