//! Request handlers.

use adm_core::archive::ARCHIVE_SUFFIX;
use adm_core::task::{TaskId, TaskStatus, TaskView};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: TaskId,
}

/// Task view as sent to clients: the archive is referenced by URL, never by
/// its path on disk.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: TaskId,
    pub status: TaskStatus,
    pub urls: Vec<String>,
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_url: Option<String>,
}

impl From<TaskView> for TaskResponse {
    fn from(view: TaskView) -> Self {
        let archive_url = match view.status {
            TaskStatus::Done => Some(format!("/archives/{}{}", view.id, ARCHIVE_SUFFIX)),
            _ => None,
        };
        Self {
            id: view.id,
            status: view.status,
            urls: view.urls,
            errors: view.errors,
            archive_url,
        }
    }
}

/// POST /tasks
pub async fn create_task(State(state): State<AppState>) -> Result<Json<CreatedResponse>, ApiError> {
    let id = state.service.create_task()?;
    Ok(Json(CreatedResponse { id }))
}

/// POST /tasks/:id
pub async fn submit_urls(
    Path(id): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::BadRequest(format!("invalid request: {}", e)))?;
    let view = state.service.submit_urls(&id, &request.urls)?;
    Ok(Json(view.into()))
}

/// GET /tasks/:id
pub async fn get_task(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<TaskResponse>, ApiError> {
    Ok(Json(state.service.get_task_view(&id)?.into()))
}

/// GET /archives/:file
pub async fn get_archive(
    Path(file): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(id) = file.strip_suffix(ARCHIVE_SUFFIX) else {
        return Err(ApiError::Task(adm_core::TaskError::NotFound(TaskId::new(file))));
    };
    let path = state.service.resolve_artifact_path(id)?;
    let body = tokio::fs::read(&path)
        .await
        .map_err(|e| ApiError::Internal(format!("read {}: {}", path.display(), e)))?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file),
            ),
        ],
        body,
    ))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let gate = state.service.gate();
    Json(json!({
        "active": gate.in_use(),
        "capacity": gate.capacity(),
    }))
}
