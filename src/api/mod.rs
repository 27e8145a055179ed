//! HTTP request layer over the task store and scheduler.
//!
//! # Routes
//!
//! - `POST /tasks` - Create a task from `{ "name"?: string, "urls": [string] }`
//!   and enqueue it; replies 201 with the task
//! - `GET /tasks` - List all tasks
//! - `GET /tasks/:id` - Get a single task (404 when unknown)

use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use crate::scheduler::Scheduler;
use crate::store::Store;

mod error;
mod routes;

pub use error::ApiError;
pub use routes::CreateTaskRequest;

/// Shared state handed to every route handler (cheap `Arc` clones).
#[derive(Debug, Clone)]
pub struct AppState {
    /// Task store.
    pub store: Arc<Store>,
    /// Worker pool that new tasks are enqueued on.
    pub scheduler: Arc<Scheduler>,
}

impl AppState {
    /// Creates the handler state.
    #[must_use]
    pub fn new(store: Arc<Store>, scheduler: Arc<Scheduler>) -> Self {
        Self { store, scheduler }
    }
}

/// Builds the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/tasks", get(routes::list_tasks).post(routes::create_task))
        .route("/tasks/:id", get(routes::get_task))
        .with_state(state)
}
