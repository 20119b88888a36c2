//! Backend buckets -> renderable series.
//!
//! Both the single and the multi-series path go through [`BucketTable`], an outer
//! join over bucket keys with one column per series.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use crate::core::util::numeric_util::NumericUtil;
use crate::domain::chart::model::{BucketSize, DataPoint, RawAggregationResponse, RawBucket, Series};

/// Column name used for the overall (non-broken-down) aggregate.
pub const TOTAL_COLUMN: &str = "total";

/// A series' state in one bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    /// The bucket has no entry for this series.
    Absent,
    /// The bucket has an entry; `None` when the overall aggregate is missing.
    Present(Option<f64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketTable {
    pub dates: Vec<DateTime<Utc>>,
    /// `(series name, cells aligned with dates)`, ordered by name.
    pub columns: Vec<(String, Vec<Cell>)>,
    pub multi_series: bool,
}

impl BucketTable {
    /// Joins buckets on their date: one row per distinct date, ascending. Duplicate dates
    /// are merged by averaging their present values.
    pub fn from_response(raw: &RawAggregationResponse) -> Self {
        let multi_series = raw.is_multi_series();

        let mut rows: BTreeMap<DateTime<Utc>, Vec<&RawBucket>> = BTreeMap::new();
        for bucket in &raw.buckets {
            let Some(date) = bucket.date() else {
                warn!("Skipping bucket without a usable key: {:?}", bucket.key);
                continue;
            };
            if multi_series && bucket.breakdown.is_none() {
                warn!(
                    "Skipping scalar bucket at {} in a broken-down response (value {:?})",
                    date, bucket.value
                );
                continue;
            }
            rows.entry(date).or_default().push(bucket);
        }

        if rows.values().any(|group| group.len() > 1) {
            debug!("Merging buckets that share a key");
        }

        let columns = if multi_series {
            let names: BTreeSet<&String> = rows
                .values()
                .flatten()
                .filter_map(|b| b.breakdown.as_ref())
                .flat_map(|breakdown| breakdown.keys())
                .collect();

            names
                .into_iter()
                .map(|name| {
                    let cells = rows
                        .values()
                        .map(|group| {
                            // A missing or null sub-aggregate is no point at all.
                            let values: Vec<f64> = group
                                .iter()
                                .filter_map(|b| b.breakdown.as_ref()?.get(name).copied().flatten())
                                .collect();
                            if values.is_empty() {
                                Cell::Absent
                            } else {
                                Cell::Present(NumericUtil::safe_mean(values))
                            }
                        })
                        .collect();
                    (name.clone(), cells)
                })
                .collect()
        } else {
            let cells = rows
                .values()
                .map(|group| Cell::Present(NumericUtil::safe_mean(group.iter().filter_map(|b| b.value))))
                .collect();
            vec![(TOTAL_COLUMN.to_string(), cells)]
        };

        Self {
            dates: rows.into_keys().collect(),
            columns,
            multi_series,
        }
    }

    pub fn row_count(&self) -> usize {
        self.dates.len()
    }

    /// Merges runs of `factor` adjacent rows: first date of the run, mean of the present
    /// values per column.
    pub fn condensed(&self, factor: usize) -> BucketTable {
        if factor <= 1 {
            return self.clone();
        }

        let dates = self.dates.chunks(factor).map(|chunk| chunk[0]).collect();

        let columns = self
            .columns
            .iter()
            .map(|(name, cells)| {
                let merged = cells
                    .chunks(factor)
                    .map(|chunk| {
                        let present: Vec<Option<f64>> = chunk
                            .iter()
                            .filter_map(|cell| match cell {
                                Cell::Present(v) => Some(*v),
                                Cell::Absent => None,
                            })
                            .collect();

                        if present.is_empty() {
                            Cell::Absent
                        } else {
                            Cell::Present(NumericUtil::safe_mean(present.into_iter().flatten()))
                        }
                    })
                    .collect();
                (name.clone(), merged)
            })
            .collect();

        BucketTable {
            dates,
            columns,
            multi_series: self.multi_series,
        }
    }

    fn into_shape(self) -> SeriesShape {
        if !self.multi_series {
            let cells = self
                .columns
                .into_iter()
                .next()
                .map(|(_, cells)| cells)
                .unwrap_or_default();

            let points = self
                .dates
                .iter()
                .zip(cells)
                .map(|(date, cell)| {
                    let value = match cell {
                        Cell::Present(v) => v,
                        Cell::Absent => None,
                    };
                    DataPoint::new(*date, value)
                })
                .collect();

            return SeriesShape::Single(Series::new(points));
        }

        let dates = self.dates;
        let series = self
            .columns
            .into_iter()
            .map(|(name, cells)| {
                let points = dates
                    .iter()
                    .zip(cells)
                    .filter_map(|(date, cell)| match cell {
                        Cell::Present(v) => Some(DataPoint::new(*date, v)),
                        Cell::Absent => None,
                    })
                    .collect();
                Series::named(name, points)
            })
            .collect();

        SeriesShape::Multi(series)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "series", rename_all = "lowercase")]
pub enum SeriesShape {
    Single(Series),
    Multi(Vec<Series>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReshapedSeries {
    pub bucket_size: BucketSize,
    pub shape: SeriesShape,
}

impl ReshapedSeries {
    pub fn series(&self) -> Vec<&Series> {
        match &self.shape {
            SeriesShape::Single(s) => vec![s],
            SeriesShape::Multi(all) => all.iter().collect(),
        }
    }

    pub fn single(&self) -> Option<&Series> {
        match &self.shape {
            SeriesShape::Single(s) => Some(s),
            SeriesShape::Multi(_) => None,
        }
    }
}

/// One point per bucket for an overall response (gaps kept as `None`), or one sparse
/// series per name for a broken-down response.
pub fn reshape(raw: &RawAggregationResponse, bucket_size: BucketSize) -> ReshapedSeries {
    let table = BucketTable::from_response(raw);
    debug!(
        "Reshaping {} buckets into {} column(s) at {}",
        table.row_count(),
        table.columns.len(),
        bucket_size
    );

    ReshapedSeries {
        bucket_size,
        shape: table.into_shape(),
    }
}

/// Like [`reshape`], but averages adjacent buckets so at most `target_points` rows remain.
/// A `target_points` of zero disables condensing.
pub fn condense(
    raw: &RawAggregationResponse,
    bucket_size: BucketSize,
    target_points: usize,
) -> ReshapedSeries {
    let table = BucketTable::from_response(raw);
    let rows = table.row_count();

    if target_points == 0 || rows <= target_points {
        return ReshapedSeries {
            bucket_size,
            shape: table.into_shape(),
        };
    }

    let factor = rows.div_ceil(target_points);
    debug!("Condensing {} buckets by {} to fit {} points", rows, factor, target_points);

    ReshapedSeries {
        bucket_size: bucket_size.scaled(factor),
        shape: table.condensed(factor).into_shape(),
    }
}
