//! Chart routes (e.g., /api/v1/charts/*)

use axum::{routing::{get, post}, Router};
use crate::api::controller::chart::ChartController;
use crate::app_state::AppState;

pub fn chart_routes() -> Router<AppState> {
    Router::new()
        .route("/window", get(ChartController::window))
        .route("/step", get(ChartController::step))
        .route("/bucket-size", get(ChartController::bucket_size))
        .route("/reshape", post(ChartController::reshape))
        .route("/split", post(ChartController::split))

        .route("/session", get(ChartController::get_session))
        .route("/session/step/{direction}", post(ChartController::step_session))
        .route("/session/granularity/{granularity}", post(ChartController::set_session_granularity))
        .route("/session/mode/{mode}", post(ChartController::set_session_mode))
        .route("/session/filter", post(ChartController::set_session_filter))
        .route("/session/refresh", post(ChartController::refresh_session))
        .route("/session/view", get(ChartController::get_session_view))
}
