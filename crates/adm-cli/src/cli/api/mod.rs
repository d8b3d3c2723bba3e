//! HTTP front end over the task engine.
//!
//! # Routes
//!
//! - `POST /tasks` - Create a task
//! - `POST /tasks/:id` - Submit URLs (`{"urls": [...]}`) and start the build
//! - `GET /tasks/:id` - Task status, urls, errors and archive link once done
//! - `GET /archives/:file` - Download `<id>.zip` of a done task
//! - `GET /health` - Admission gate usage

mod error;
mod routes;

use adm_core::ArchiveService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ArchiveService>,
}

pub fn create_router(service: Arc<ArchiveService>) -> Router {
    Router::new()
        .route("/tasks", post(routes::create_task))
        .route(
            "/tasks/:id",
            get(routes::get_task).post(routes::submit_urls),
        )
        .route("/archives/:file", get(routes::get_archive))
        .route("/health", get(routes::health))
        .with_state(AppState { service })
        .layer(TraceLayer::new_for_http())
}
