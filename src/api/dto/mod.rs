pub mod chart_dto;

use serde::Serialize;

/// Envelope for every JSON response of the API.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub is_successful: bool,
    pub data: Option<T>,
    pub error_msg: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            is_successful: true,
            data: Some(data),
            error_msg: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            is_successful: false,
            data: None,
            error_msg: Some(msg.into()),
        }
    }
}
