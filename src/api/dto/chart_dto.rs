//! Chart API DTOs
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::chart::model::Series;

/// `?granularity=&start=`; both optional, missing start means the default window.
#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    pub granularity: Option<String>,
    pub start: Option<i64>,
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepDirection {
    Forward,
    Backward,
}

#[derive(Debug, Deserialize)]
pub struct StepQuery {
    pub granularity: Option<String>,
    pub start: i64,
    pub direction: StepDirection,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BucketSizeQuery {
    #[validate(range(min = 1))]
    pub length_ms: i64,
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BucketSizeResponse {
    pub bucket_size: String,
    pub millis: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReshapeQuery {
    #[validate(length(min = 1))]
    pub bucket_size: String,
    pub target_points: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SplitQuery {
    pub granularity: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SplitResponse {
    pub day: Series,
    pub night: Series,
}

/// Body of `POST /session/filter`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ChartFilterRequest {
    #[validate(length(min = 1, max = 128))]
    pub site_id: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub device_id: Option<String>,
}
