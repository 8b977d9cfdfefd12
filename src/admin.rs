//! Admin-only task oversight endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument};

use crate::auth::extractors::CurrentUser;
use crate::auth::policy;
use crate::error::ApiError;
use crate::state::AppState;
use crate::tasks::repo_types::Task;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/tasks", get(list_all_tasks))
        .route("/admin/tasks/:id", delete(delete_any_task))
}

#[instrument(skip(state))]
async fn list_all_tasks(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<Vec<Task>>, ApiError> {
    policy::require_admin(&identity)?;
    let tasks = Task::list_all(&state.db).await?;
    Ok(Json(tasks))
}

#[instrument(skip(state))]
async fn delete_any_task(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(task_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    policy::require_admin(&identity)?;
    if !Task::delete_any(&state.db, task_id).await? {
        return Err(ApiError::NotFound);
    }
    info!(task_id, admin = %identity.username, "task deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}
