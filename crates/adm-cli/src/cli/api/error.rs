//! Mapping of engine errors to HTTP responses.

use adm_core::TaskError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    Task(TaskError),
    BadRequest(String),
    Internal(String),
}

impl From<TaskError> for ApiError {
    fn from(e: TaskError) -> Self {
        ApiError::Task(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Task(TaskError::Busy) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Task(TaskError::NotFound(_)) | ApiError::Task(TaskError::NotReady { .. }) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Task(TaskError::InvalidState { .. }) => StatusCode::CONFLICT,
            ApiError::Task(TaskError::EntropyUnavailable(_)) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Task(e) => e.to_string(),
            ApiError::BadRequest(m) | ApiError::Internal(m) => m.clone(),
        };
        if status.is_server_error() {
            tracing::error!(%status, "{}", message);
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}
