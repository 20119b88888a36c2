use anyhow::Result;
use axum::Json;

use crate::api::dto::ApiResponse;
use crate::errors::AppError;

/// Wraps a domain result in the response envelope; errors go through `on_err`.
pub fn to_json_with<T, F>(result: Result<T>, on_err: F) -> Result<Json<ApiResponse<T>>, AppError>
where
    T: serde::Serialize,
    F: FnOnce(anyhow::Error) -> AppError,
{
    match result {
        Ok(value) => Ok(Json(ApiResponse::ok(value))),
        Err(err) => Err(on_err(err)), // preserves original error string
    }
}

pub fn ok_json<T: serde::Serialize>(value: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok(value))
}
