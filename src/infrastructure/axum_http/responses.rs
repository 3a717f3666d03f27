use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::application::error::EngineError;

/// Uniform response envelope for every endpoint, success or failure.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: bool,
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub fn ok<T: Serialize>(message: &str, data: T) -> Response {
    with_status(StatusCode::OK, message, data)
}

pub fn created<T: Serialize>(message: &str, data: T) -> Response {
    with_status(StatusCode::CREATED, message, data)
}

fn with_status<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    let body = ApiResponse {
        status: true,
        status_code: status.as_u16(),
        message: message.to_string(),
        data: Some(data),
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            // Internal detail stays in the logs.
            EngineError::Internal(err) => {
                error!(error = ?err, "request failed with internal error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ApiResponse::<serde_json::Value> {
            status: false,
            status_code: status.as_u16(),
            message,
            data: None,
        };
        (status, Json(body)).into_response()
    }
}
