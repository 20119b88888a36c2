//! Glues the pure pipeline pieces into renderer-facing values.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::core::util::clock::Clock;
use crate::domain::chart::dto::chart_view::{ChartView, DiurnalSeries, WindowSnapshot};
use crate::domain::chart::model::{ChartMode, Granularity, RawAggregationResponse};
use crate::domain::chart::service::bucket_size_selector::select_bucket_size;
use crate::domain::chart::service::diurnal_splitter::{split_day_night, DiurnalBoundary};
use crate::domain::chart::service::series_reshaper::{condense, reshape};
use crate::domain::chart::service::time_rounder::window_bounds;
use crate::domain::chart::service::window_label_formatter::label;
use crate::domain::chart::service::window_navigator::is_next_disabled;

pub fn build_window_snapshot(
    clock: &dyn Clock,
    tz: &Tz,
    start: DateTime<Utc>,
    granularity: Granularity,
    mode: ChartMode,
) -> WindowSnapshot {
    let window = window_bounds(clock, tz, start, granularity);
    let now = clock.now();

    WindowSnapshot {
        granularity,
        mode,
        window,
        label: label(start, granularity, clock, tz),
        next_disabled: is_next_disabled(start, granularity, now),
        bucket_size: select_bucket_size(granularity.duration(), mode),
    }
}

/// Reshapes `raw` for `snapshot`, condensing to `target_points` when non-zero and
/// adding the day/night split for single-series HOUR/DAY views.
pub fn build_chart_view(
    snapshot: WindowSnapshot,
    raw: &RawAggregationResponse,
    tz: &Tz,
    boundary: &DiurnalBoundary,
    target_points: usize,
) -> ChartView {
    let series = if target_points > 0 {
        condense(raw, snapshot.bucket_size, target_points)
    } else {
        reshape(raw, snapshot.bucket_size)
    };

    let diurnal = if snapshot.granularity.is_diurnal() {
        series.single().map(|s| {
            let (day, night) = split_day_night(s, tz, boundary);
            DiurnalSeries { day, night }
        })
    } else {
        None
    };

    let summaries = series.series().iter().map(|s| s.summary()).collect();

    ChartView {
        snapshot,
        series,
        diurnal,
        summaries,
    }
}
