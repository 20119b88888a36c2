use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampMilliSeconds};

use crate::domain::chart::model::{BucketSize, Granularity, TimeWindow};

pub const DEFAULT_QUERY_TYPE: &str = "avgTotal";

/// Restricts a query to one site or one device; empty means the whole fleet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChartFilter {
    pub site_id: Option<String>,
    pub device_id: Option<String>,
}

/// Search body sent to the query backend.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartQueryRequest {
    #[serde(rename = "type")]
    pub query_type: String,
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub start_date: DateTime<Utc>,
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub end_date: DateTime<Utc>,
    /// Set exactly for DAY windows so the backend may pre-aggregate day/night cohorts.
    pub daylight: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_size: Option<BucketSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl ChartQueryRequest {
    pub fn for_window(
        query_type: &str,
        window: &TimeWindow,
        granularity: Granularity,
        bucket_size: Option<BucketSize>,
        filter: &ChartFilter,
    ) -> Self {
        Self {
            query_type: query_type.to_string(),
            start_date: window.start,
            end_date: window.end,
            daylight: granularity == Granularity::Day,
            bucket_size,
            site_id: filter.site_id.clone(),
            device_id: filter.device_id.clone(),
        }
    }
}
