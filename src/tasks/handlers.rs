use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::TaskRequest;
use super::repo_types::Task;
use crate::auth::extractors::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
}

#[instrument(skip(state))]
async fn list_tasks(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = Task::list_by_owner(&state.db, identity.user_id).await?;
    Ok(Json(tasks))
}

#[instrument(skip(state))]
async fn get_task(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(task_id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    let task = Task::find_owned(&state.db, task_id, identity.user_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(task))
}

#[instrument(skip(state, payload))]
async fn create_task(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(payload): Json<TaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    payload.validate()?;

    // The owner is always the authenticated identity; the payload cannot
    // assign tasks to someone else.
    let task = Task::create(
        &state.db,
        identity.user_id,
        &payload.title,
        &payload.description,
        payload.priority,
        payload.complete,
    )
    .await?;

    info!(task_id = task.id, user_id = identity.user_id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

#[instrument(skip(state, payload))]
async fn update_task(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(task_id): Path<i64>,
    Json(payload): Json<TaskRequest>,
) -> Result<Json<Task>, ApiError> {
    payload.validate()?;

    let task = Task::update_owned(
        &state.db,
        task_id,
        identity.user_id,
        &payload.title,
        &payload.description,
        payload.priority,
        payload.complete,
    )
    .await?
    .ok_or(ApiError::NotFound)?;

    info!(task_id, user_id = identity.user_id, "task updated");
    Ok(Json(task))
}

#[instrument(skip(state))]
async fn delete_task(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(task_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !Task::delete_owned(&state.db, task_id, identity.user_id).await? {
        return Err(ApiError::NotFound);
    }
    info!(task_id, user_id = identity.user_id, "task deleted");
    Ok(StatusCode::NO_CONTENT)
}
