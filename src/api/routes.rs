//! Route handlers for task submission and inspection.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use super::{ApiError, AppState};
use crate::task::{Task, generate_task_id};

/// Body of `POST /tasks`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTaskRequest {
    /// Optional display name; an empty string is treated as absent.
    #[serde(default)]
    pub name: Option<String>,
    /// URLs to download, in processing order.
    #[serde(default)]
    pub urls: Vec<String>,
}

/// `POST /tasks`: persist a new task, then hand it to the scheduler.
#[instrument(skip_all)]
pub(super) async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    if request.urls.is_empty() {
        return Err(ApiError::BadRequest("empty urls".to_string()));
    }

    let task = Task::new(generate_task_id(), request.name, request.urls);
    if let Err(e) = state.store.add_task(task.clone()).await {
        warn!(task_id = %task.id, error = %e, "failed to persist new task");
        return Err(e.into());
    }

    if let Err(e) = state.scheduler.enqueue(task.id.clone()).await {
        // Only reachable if the pool was stopped while requests were still served.
        error!(task_id = %task.id, error = %e, "task accepted after scheduler stop");
        return Err(e.into());
    }

    info!(task_id = %task.id, files = task.files.len(), "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// `GET /tasks`
pub(super) async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    Json(state.store.list_tasks().await)
}

/// `GET /tasks/:id`
pub(super) async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    match state.store.get_task(&id).await {
        Some(task) => Ok(Json(task)),
        None => Err(ApiError::NotFound(id)),
    }
}

