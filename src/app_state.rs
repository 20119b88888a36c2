use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use tracing::info;

use crate::core::client::query_backend::{HttpQueryBackend, QueryBackend};
use crate::core::config::app_config::AppConfig;
use crate::core::util::clock::{Clock, SystemClock};
use crate::domain::chart::dto::chart_view::WindowSnapshot;
use crate::domain::chart::model::{BucketSize, ChartMode, Granularity, RawAggregationResponse, Series};
use crate::domain::chart::service::bucket_size_selector::select_bucket_size;
use crate::domain::chart::service::chart_session::ChartSession;
use crate::domain::chart::service::chart_view_builder::build_window_snapshot;
use crate::domain::chart::service::diurnal_splitter::{split_day_night, DiurnalBoundary};
use crate::domain::chart::service::series_reshaper::{condense, reshape, ReshapedSeries};
use crate::domain::chart::service::time_rounder::window_start_for_granularity;
use crate::domain::chart::service::window_navigator::{self, StepOutcome};

pub type SharedChartSession = ChartSession<Arc<dyn QueryBackend>, Arc<dyn Clock>>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub chart_service: Arc<ChartService>,
    pub chart_session: Arc<SharedChartSession>,
}

/// Production state: HTTP backend and wall clock.
pub fn build_app_state(config: AppConfig) -> Result<AppState> {
    let backend = HttpQueryBackend::from_url(config.backend_url.clone(), config.backend_token.clone())?;
    info!("Query backend: {}", config.backend_url);
    Ok(build_app_state_with(config, Arc::new(backend), Arc::new(SystemClock)))
}

pub fn build_app_state_with(
    config: AppConfig,
    backend: Arc<dyn QueryBackend>,
    clock: Arc<dyn Clock>,
) -> AppState {
    let session = ChartSession::new(backend, clock.clone(), config.timezone, config.boundary)
        .with_query_type(config.query_type.clone());

    AppState {
        chart_service: Arc::new(ChartService::new(clock, config.timezone, config.boundary)),
        chart_session: Arc::new(session),
        config: Arc::new(config),
    }
}

/// Stateless chart computations, bound to the configured zone and day boundary.
pub struct ChartService {
    clock: Arc<dyn Clock>,
    tz: Tz,
    boundary: DiurnalBoundary,
}

impl ChartService {
    pub fn new(clock: Arc<dyn Clock>, tz: Tz, boundary: DiurnalBoundary) -> Self {
        Self { clock, tz, boundary }
    }

    /// Snapshot for `start_ms`, or for the granularity's default window when absent.
    pub fn window(
        &self,
        granularity: Granularity,
        start_ms: Option<i64>,
        mode: ChartMode,
    ) -> Result<WindowSnapshot> {
        let start = match start_ms {
            Some(ms) => millis_to_utc(ms)?,
            None => window_start_for_granularity(self.clock.as_ref(), &self.tz, granularity),
        };
        Ok(build_window_snapshot(self.clock.as_ref(), &self.tz, start, granularity, mode))
    }

    pub fn step(&self, granularity: Granularity, start_ms: i64, forward: bool) -> Result<StepOutcome> {
        let start = millis_to_utc(start_ms)?;
        let now = self.clock.now();
        Ok(if forward {
            window_navigator::step_forward(start, granularity, now)
        } else {
            window_navigator::step_backward(start, granularity, now)
        })
    }

    pub fn bucket_size(&self, window_length: Duration, mode: ChartMode) -> BucketSize {
        select_bucket_size(window_length, mode)
    }

    pub fn reshape(
        &self,
        raw: &RawAggregationResponse,
        bucket_token: &str,
        target_points: usize,
    ) -> Result<ReshapedSeries> {
        let bucket_size = BucketSize::parse(bucket_token)
            .ok_or_else(|| anyhow!("Unknown bucket size '{}'", bucket_token))?;
        Ok(if target_points > 0 {
            condense(raw, bucket_size, target_points)
        } else {
            reshape(raw, bucket_size)
        })
    }

    pub fn split(&self, series: &Series) -> (Series, Series) {
        split_day_night(series, &self.tz, &self.boundary)
    }
}

fn millis_to_utc(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms).ok_or_else(|| anyhow!("Timestamp {} is out of range", ms))
}
