//! Account endpoints for the logged-in user.

use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::auth::claims::Identity;
use crate::auth::extractors::CurrentUser;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo_types::User;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ChangePasswordRequest {
    password: String,
    new_password: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/get_user", get(get_user))
        .route("/users/change-password", put(change_password))
}

#[instrument(skip_all)]
async fn get_user(CurrentUser(identity): CurrentUser) -> Json<Identity> {
    Json(identity)
}

/// Re-verifies the current password before writing the new hash. Usernames
/// are immutable and the store serializes per-row updates, so no extra
/// locking is needed between the verify and the write.
#[instrument(skip(state, payload))]
async fn change_password(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if payload.new_password.len() < 5 {
        return Err(ApiError::BadRequest(
            "New password must be at least 5 characters".into(),
        ));
    }

    let user = User::find_by_id(&state.db, identity.user_id)
        .await?
        .ok_or(ApiError::NotAuthenticated)?;

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = user.id, "current password verification failed");
        return Err(ApiError::InvalidCredentials);
    }

    let hash = hash_password(&payload.new_password)?;
    User::update_password_hash(&state.db, user.id, &hash).await?;

    info!(user_id = user.id, "password changed");
    Ok(Json(json!({ "detail": "Password changed" })))
}
