//! Chart domain types (Granularity, TimeWindow, Series, backend buckets, ...)

pub mod bucket_size;
pub mod chart_mode;
pub mod granularity;
pub mod raw_aggregation;
pub mod series;
pub mod time_window;

pub use bucket_size::BucketSize;
pub use chart_mode::ChartMode;
pub use granularity::Granularity;
pub use raw_aggregation::{RawAggregationResponse, RawBucket};
pub use series::{DataPoint, Series, SeriesSummary};
pub use time_window::TimeWindow;
