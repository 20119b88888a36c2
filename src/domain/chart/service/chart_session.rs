//! Stateful host for one chart: current window, mode and filter, plus the last
//! rendered view.
//!
//! Every state change and every refresh takes a new generation number. A backend
//! response is applied only if its generation is still the latest one when it
//! arrives, so a slow answer for an old window can never overwrite a newer view.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use serde_with::{serde_as, TimestampMilliSeconds};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::core::client::query_backend::QueryBackend;
use crate::core::util::clock::Clock;
use crate::domain::chart::dto::chart_query_request::{ChartFilter, ChartQueryRequest, DEFAULT_QUERY_TYPE};
use crate::domain::chart::dto::chart_view::{ChartView, WindowSnapshot};
use crate::domain::chart::model::{ChartMode, Granularity};
use crate::domain::chart::service::chart_view_builder::{build_chart_view, build_window_snapshot};
use crate::domain::chart::service::diurnal_splitter::DiurnalBoundary;
use crate::domain::chart::service::time_rounder::window_start_for_granularity;
use crate::domain::chart::service::window_navigator::{self, StepOutcome};

/// Mutable part of a session, always read and written together.
#[serde_as]
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub granularity: Granularity,
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub start: DateTime<Utc>,
    pub mode: ChartMode,
    pub query_type: String,
    pub filter: ChartFilter,
    #[serde(skip)]
    pub last_view: Option<ChartView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "view", rename_all = "lowercase")]
pub enum RefreshOutcome {
    Applied(ChartView),
    /// A newer request or state change superseded this one.
    Discarded,
}

pub struct ChartSession<B: QueryBackend, C: Clock> {
    backend: B,
    clock: C,
    tz: Tz,
    boundary: DiurnalBoundary,
    state: RwLock<SessionState>,
    generation: AtomicU64,
}

impl<B: QueryBackend, C: Clock> ChartSession<B, C> {
    /// Starts on the current DAY window in line mode.
    pub fn new(backend: B, clock: C, tz: Tz, boundary: DiurnalBoundary) -> Self {
        let granularity = Granularity::default();
        let start = window_start_for_granularity(&clock, &tz, granularity);

        Self {
            backend,
            clock,
            tz,
            boundary,
            state: RwLock::new(SessionState {
                granularity,
                start,
                mode: ChartMode::default(),
                query_type: DEFAULT_QUERY_TYPE.to_string(),
                filter: ChartFilter::default(),
                last_view: None,
            }),
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_query_type(mut self, query_type: impl Into<String>) -> Self {
        self.state.get_mut().query_type = query_type.into();
        self
    }

    fn bump(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn snapshot(&self) -> WindowSnapshot {
        let state = self.state.read().await;
        build_window_snapshot(&self.clock, &self.tz, state.start, state.granularity, state.mode)
    }

    /// Switches granularity and jumps to that granularity's default window.
    pub async fn set_granularity(&self, granularity: Granularity) -> WindowSnapshot {
        let mut state = self.state.write().await;
        state.granularity = granularity;
        state.start = window_start_for_granularity(&self.clock, &self.tz, granularity);
        self.bump();
        info!("Chart granularity set to {} (start {})", granularity, state.start);

        build_window_snapshot(&self.clock, &self.tz, state.start, granularity, state.mode)
    }

    pub async fn set_mode(&self, mode: ChartMode) -> WindowSnapshot {
        let mut state = self.state.write().await;
        state.mode = mode;
        self.bump();

        build_window_snapshot(&self.clock, &self.tz, state.start, state.granularity, mode)
    }

    pub async fn set_filter(&self, filter: ChartFilter) {
        let mut state = self.state.write().await;
        state.filter = filter;
        self.bump();
    }

    pub async fn step_forward(&self) -> StepOutcome {
        self.step_with(window_navigator::step_forward).await
    }

    pub async fn step_backward(&self) -> StepOutcome {
        self.step_with(window_navigator::step_backward).await
    }

    async fn step_with(
        &self,
        f: fn(DateTime<Utc>, Granularity, DateTime<Utc>) -> StepOutcome,
    ) -> StepOutcome {
        let mut state = self.state.write().await;
        let outcome = f(state.start, state.granularity, self.clock.now());
        if outcome.applied {
            state.start = outcome.start;
            self.bump();
        }
        outcome
    }

    /// Queries the backend for the current window and applies the result unless a
    /// newer refresh or state change happened meanwhile. On error the previous view
    /// is kept.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let (ticket, snapshot, request) = {
            let state = self.state.read().await;
            let snapshot =
                build_window_snapshot(&self.clock, &self.tz, state.start, state.granularity, state.mode);
            let request = ChartQueryRequest::for_window(
                &state.query_type,
                &snapshot.window,
                state.granularity,
                Some(snapshot.bucket_size),
                &state.filter,
            );
            (self.bump(), snapshot, request)
        };

        let result = self.backend.search(&request).await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!("Discarding stale chart response (generation {})", ticket);
            return Ok(RefreshOutcome::Discarded);
        }

        let raw = result.map_err(|e| {
            warn!("Chart refresh failed, keeping previous view: {}", e);
            e
        })?;

        let view = build_chart_view(snapshot, &raw, &self.tz, &self.boundary, 0);
        state.last_view = Some(view.clone());
        Ok(RefreshOutcome::Applied(view))
    }

    pub async fn last_view(&self) -> Option<ChartView> {
        self.state.read().await.last_view.clone()
    }
}
