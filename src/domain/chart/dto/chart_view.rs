use serde::Serialize;

use crate::domain::chart::model::{BucketSize, ChartMode, Granularity, Series, SeriesSummary, TimeWindow};
use crate::domain::chart::service::series_reshaper::ReshapedSeries;

/// Everything the renderer needs before data arrives.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowSnapshot {
    pub granularity: Granularity,
    pub mode: ChartMode,
    pub window: TimeWindow,
    pub label: String,
    pub next_disabled: bool,
    pub bucket_size: BucketSize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiurnalSeries {
    pub day: Series,
    pub night: Series,
}

/// A fully resolved chart: window state plus renderable series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    #[serde(flatten)]
    pub snapshot: WindowSnapshot,
    pub series: ReshapedSeries,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diurnal: Option<DiurnalSeries>,
    pub summaries: Vec<SeriesSummary>,
}
