use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampMilliSeconds};

use crate::core::util::numeric_util::NumericUtil;

/// One chart point. `value: None` renders as a gap, never as zero.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub date: DateTime<Utc>,
    pub value: Option<f64>,
}

impl DataPoint {
    pub fn new(date: DateTime<Utc>, value: Option<f64>) -> Self {
        Self { date, value }
    }
}

/// Points in ascending date order, optionally tagged with a site or device name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Series {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub points: Vec<DataPoint>,
}

impl Series {
    pub fn new(points: Vec<DataPoint>) -> Self {
        Self { name: None, points }
    }

    pub fn named(name: impl Into<String>, points: Vec<DataPoint>) -> Self {
        Self {
            name: Some(name.into()),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn summary(&self) -> SeriesSummary {
        let present: Vec<f64> = self
            .points
            .iter()
            .filter_map(|p| p.value)
            .filter(|v| v.is_finite())
            .collect();

        SeriesSummary {
            name: self.name.clone(),
            point_count: self.points.len(),
            gap_count: self.points.len() - present.len(),
            min: present.iter().copied().reduce(f64::min),
            max: present.iter().copied().reduce(f64::max),
            mean: NumericUtil::safe_mean(present.iter().copied())
                .map(|m| NumericUtil::round_to(m, 3)),
        }
    }
}

/// Header figures shown next to a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub point_count: usize,
    pub gap_count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}
