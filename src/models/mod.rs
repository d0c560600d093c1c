// Domain models: series, bucket boundaries, output rows, host coverage

mod bucket;
mod coverage;
mod series;

pub use bucket::{Bound, BucketBoundary, BucketRow, UNBOUNDED_LABEL};
pub use coverage::{GroupCoverage, HostCoverage};
pub use series::{RawSeries, Series, SeriesLabels, normalize};
