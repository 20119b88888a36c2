//! Chart controller: connects chart routes to the chart service and session

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Duration;
use serde::Serialize;
use validator::Validate;

use crate::api::dto::chart_dto::{
    BucketSizeQuery, BucketSizeResponse, ChartFilterRequest, ReshapeQuery, SplitQuery,
    SplitResponse, StepDirection, StepQuery, WindowQuery,
};
use crate::api::dto::ApiResponse;
use crate::api::util::json::{ok_json, to_json_with};
use crate::app_state::AppState;
use crate::domain::chart::dto::chart_query_request::ChartFilter;
use crate::domain::chart::dto::chart_view::{ChartView, WindowSnapshot};
use crate::domain::chart::model::{ChartMode, Granularity, RawAggregationResponse, Series};
use crate::domain::chart::service::chart_session::{RefreshOutcome, SessionState};
use crate::domain::chart::service::series_reshaper::ReshapedSeries;
use crate::domain::chart::service::window_navigator::StepOutcome;
use crate::errors::{backend_error, bad_request, AppError};

type JsonResult<T> = Result<Json<ApiResponse<T>>, AppError>;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub state: SessionState,
    pub window: WindowSnapshot,
}

fn granularity_of(raw: Option<&str>) -> Granularity {
    raw.map(Granularity::parse_or_default).unwrap_or_default()
}

fn mode_of(raw: Option<&str>) -> ChartMode {
    raw.map(ChartMode::parse_or_default).unwrap_or_default()
}

pub struct ChartController;

impl ChartController {
    pub async fn window(
        State(state): State<AppState>,
        Query(q): Query<WindowQuery>,
    ) -> JsonResult<WindowSnapshot> {
        let granularity = granularity_of(q.granularity.as_deref());
        let mode = mode_of(q.mode.as_deref());
        to_json_with(state.chart_service.window(granularity, q.start, mode), bad_request)
    }

    pub async fn step(
        State(state): State<AppState>,
        Query(q): Query<StepQuery>,
    ) -> JsonResult<StepOutcome> {
        let granularity = granularity_of(q.granularity.as_deref());
        let forward = q.direction == StepDirection::Forward;
        to_json_with(state.chart_service.step(granularity, q.start, forward), bad_request)
    }

    pub async fn bucket_size(
        State(state): State<AppState>,
        Query(q): Query<BucketSizeQuery>,
    ) -> JsonResult<BucketSizeResponse> {
        q.validate()?;
        let size = state
            .chart_service
            .bucket_size(Duration::milliseconds(q.length_ms), mode_of(q.mode.as_deref()));
        Ok(ok_json(BucketSizeResponse {
            bucket_size: size.token(),
            millis: size.as_millis(),
        }))
    }

    pub async fn reshape(
        State(state): State<AppState>,
        Query(q): Query<ReshapeQuery>,
        Json(raw): Json<RawAggregationResponse>,
    ) -> JsonResult<ReshapedSeries> {
        q.validate()?;
        let target = q.target_points.unwrap_or(0);
        to_json_with(state.chart_service.reshape(&raw, &q.bucket_size, target), bad_request)
    }

    pub async fn split(
        State(state): State<AppState>,
        Query(q): Query<SplitQuery>,
        Json(series): Json<Series>,
    ) -> JsonResult<SplitResponse> {
        if let Some(g) = q.granularity.as_deref() {
            let granularity = Granularity::parse_or_default(g);
            if !granularity.is_diurnal() {
                return Err(AppError::BadRequest(format!(
                    "Day/night split applies to hour and day windows, not {}",
                    granularity
                )));
            }
        }
        let (day, night) = state.chart_service.split(&series);
        Ok(ok_json(SplitResponse { day, night }))
    }

    pub async fn get_session(State(state): State<AppState>) -> JsonResult<SessionResponse> {
        let session = &state.chart_session;
        Ok(ok_json(SessionResponse {
            state: session.state().await,
            window: session.snapshot().await,
        }))
    }

    pub async fn step_session(
        State(state): State<AppState>,
        Path(direction): Path<StepDirection>,
    ) -> JsonResult<StepOutcome> {
        let outcome = match direction {
            StepDirection::Forward => state.chart_session.step_forward().await,
            StepDirection::Backward => state.chart_session.step_backward().await,
        };
        Ok(ok_json(outcome))
    }

    pub async fn set_session_granularity(
        State(state): State<AppState>,
        Path(granularity): Path<String>,
    ) -> JsonResult<WindowSnapshot> {
        let granularity = Granularity::parse_or_default(&granularity);
        Ok(ok_json(state.chart_session.set_granularity(granularity).await))
    }

    pub async fn set_session_mode(
        State(state): State<AppState>,
        Path(mode): Path<String>,
    ) -> JsonResult<WindowSnapshot> {
        let mode = ChartMode::parse_or_default(&mode);
        Ok(ok_json(state.chart_session.set_mode(mode).await))
    }

    pub async fn set_session_filter(
        State(state): State<AppState>,
        Json(req): Json<ChartFilterRequest>,
    ) -> JsonResult<ChartFilter> {
        req.validate()?;
        let filter = ChartFilter {
            site_id: req.site_id,
            device_id: req.device_id,
        };
        state.chart_session.set_filter(filter.clone()).await;
        Ok(ok_json(filter))
    }

    pub async fn refresh_session(State(state): State<AppState>) -> JsonResult<RefreshOutcome> {
        to_json_with(state.chart_session.refresh().await, backend_error)
    }

    pub async fn get_session_view(State(state): State<AppState>) -> JsonResult<ChartView> {
        state
            .chart_session
            .last_view()
            .await
            .map(ok_json)
            .ok_or_else(|| AppError::NotFound("No chart view has been loaded yet".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::build_app_state_with;
    use crate::core::client::query_backend::QueryBackend;
    use crate::core::config::app_config::AppConfig;
    use crate::core::util::clock::FixedClock;
    use crate::domain::chart::dto::chart_query_request::ChartQueryRequest;
    use crate::domain::chart::model::{BucketSize, DataPoint, RawBucket};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::{Arc, Mutex};

    /// Answers every query with the same response, or fails when `fail` is set.
    #[derive(Default)]
    struct StaticBackend {
        fail: bool,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl QueryBackend for StaticBackend {
        async fn search(&self, request: &ChartQueryRequest) -> Result<RawAggregationResponse> {
            *self.calls.lock().unwrap() += 1;
            if self.fail {
                return Err(anyhow!("backend unavailable"));
            }
            Ok(RawAggregationResponse::new(vec![RawBucket::scalar(
                request.start_date.timestamp_millis(),
                Some(3.0),
            )]))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 12, 25, 15, 30, 0).unwrap()
    }

    fn state_with(backend: StaticBackend) -> AppState {
        build_app_state_with(
            AppConfig::default(),
            Arc::new(backend),
            Arc::new(FixedClock::new(now())),
        )
    }

    fn state() -> AppState {
        state_with(StaticBackend::default())
    }

    fn data<T>(resp: JsonResult<T>) -> T {
        let Json(body) = resp.unwrap_or_else(|e| panic!("handler failed: {e}"));
        assert!(body.is_successful);
        body.data.unwrap()
    }

    #[tokio::test]
    async fn window_defaults_to_today() {
        let snap = data(ChartController::window(State(state()), Query(WindowQuery::default())).await);
        assert_eq!(snap.granularity, Granularity::Day);
        assert_eq!(snap.window.end, now());
        assert!(snap.next_disabled);
    }

    #[tokio::test]
    async fn window_for_explicit_start() {
        let q = WindowQuery {
            granularity: Some("week".into()),
            start: Some(Utc.with_ymd_and_hms(2023, 12, 11, 0, 0, 0).unwrap().timestamp_millis()),
            mode: Some("bar".into()),
        };
        let snap = data(ChartController::window(State(state()), Query(q)).await);
        assert_eq!(snap.granularity, Granularity::Week);
        assert_eq!(snap.mode, ChartMode::Bar);
        assert_eq!(snap.bucket_size, BucketSize::SIX_HOURS);
        assert_eq!(snap.label, "2023-12-11 - 2023-12-18");
    }

    #[tokio::test]
    async fn out_of_range_start_is_bad_request() {
        let q = WindowQuery {
            start: Some(i64::MAX),
            ..Default::default()
        };
        let err = ChartController::window(State(state()), Query(q)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stateless_step_matches_navigator() {
        let q = StepQuery {
            granularity: Some("day".into()),
            start: Utc.with_ymd_and_hms(2023, 12, 24, 0, 0, 0).unwrap().timestamp_millis(),
            direction: StepDirection::Forward,
        };
        let outcome = data(ChartController::step(State(state()), Query(q)).await);
        assert!(outcome.applied);
        assert!(outcome.next_disabled);
        assert_eq!(outcome.start, Utc.with_ymd_and_hms(2023, 12, 25, 0, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn bucket_size_endpoint() {
        let q = BucketSizeQuery {
            length_ms: 86_400_000,
            mode: None,
        };
        let resp = data(ChartController::bucket_size(State(state()), Query(q)).await);
        assert_eq!(resp.bucket_size, "5m");
        assert_eq!(resp.millis, 300_000);

        let bad = BucketSizeQuery {
            length_ms: 0,
            mode: None,
        };
        let err = ChartController::bucket_size(State(state()), Query(bad)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reshape_endpoint_condenses() {
        let start = Utc.with_ymd_and_hms(2023, 12, 25, 0, 0, 0).unwrap();
        let raw = RawAggregationResponse::new(
            (0..10)
                .map(|i| RawBucket::scalar((start + Duration::minutes(i)).timestamp_millis(), Some(1.0)))
                .collect(),
        );
        let q = ReshapeQuery {
            bucket_size: "1m".into(),
            target_points: Some(5),
        };
        let reshaped = data(ChartController::reshape(State(state()), Query(q), Json(raw)).await);
        assert_eq!(reshaped.single().unwrap().len(), 5);
        assert_eq!(reshaped.bucket_size, BucketSize::parse("2m").unwrap());
    }

    #[tokio::test]
    async fn reshape_rejects_unknown_bucket() {
        let q = ReshapeQuery {
            bucket_size: "fortnight".into(),
            target_points: None,
        };
        let err = ChartController::reshape(State(state()), Query(q), Json(RawAggregationResponse::default()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn split_endpoint() {
        let series = Series::new(vec![
            DataPoint::new(Utc.with_ymd_and_hms(2023, 6, 21, 3, 0, 0).unwrap(), Some(0.0)),
            DataPoint::new(Utc.with_ymd_and_hms(2023, 6, 21, 12, 0, 0).unwrap(), Some(5.0)),
        ]);
        let q = SplitQuery {
            granularity: Some("day".into()),
        };
        let resp = data(ChartController::split(State(state()), Query(q), Json(series.clone())).await);
        assert_eq!(resp.day.len(), 1);
        assert_eq!(resp.night.len(), 1);

        let week = SplitQuery {
            granularity: Some("week".into()),
        };
        let err = ChartController::split(State(state()), Query(week), Json(series)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn session_flow() {
        let state = state();

        let err = ChartController::get_session_view(State(state.clone())).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let back = data(
            ChartController::step_session(State(state.clone()), Path(StepDirection::Backward)).await,
        );
        assert!(back.applied);

        let outcome = data(ChartController::refresh_session(State(state.clone())).await);
        assert!(matches!(outcome, RefreshOutcome::Applied(_)));

        let view = data(ChartController::get_session_view(State(state.clone())).await);
        assert_eq!(view.snapshot.window.start, Utc.with_ymd_and_hms(2023, 12, 24, 0, 0, 0).unwrap());

        let snap = data(
            ChartController::set_session_granularity(State(state.clone()), Path("month".into())).await,
        );
        assert_eq!(snap.granularity, Granularity::Month);

        let session = data(ChartController::get_session(State(state)).await);
        assert_eq!(session.state.granularity, Granularity::Month);
        assert_eq!(session.window.granularity, Granularity::Month);
    }

    #[tokio::test]
    async fn session_mode_and_filter() {
        let state = state();
        let snap = data(ChartController::set_session_mode(State(state.clone()), Path("bar".into())).await);
        assert_eq!(snap.mode, ChartMode::Bar);

        let filter = data(
            ChartController::set_session_filter(
                State(state.clone()),
                Json(ChartFilterRequest {
                    site_id: Some("roof-a".into()),
                    device_id: None,
                }),
            )
            .await,
        );
        assert_eq!(filter.site_id.as_deref(), Some("roof-a"));
        assert_eq!(state.chart_session.state().await.filter, filter);

        let err = ChartController::set_session_filter(
            State(state),
            Json(ChartFilterRequest {
                site_id: Some(String::new()),
                device_id: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn failed_refresh_is_bad_gateway() {
        let state = state_with(StaticBackend {
            fail: true,
            ..Default::default()
        });
        let err = ChartController::refresh_session(State(state)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }
}
