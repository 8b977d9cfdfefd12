use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Boundary error for every JSON endpoint. Page-flow failures are handled
/// by the guard as redirects and never reach this type.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown username or wrong password; the client cannot tell which.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Token absent, malformed, expired or incomplete in a strict context.
    #[error("not authenticated")]
    NotAuthenticated,
    /// Valid identity, insufficient role.
    #[error("insufficient privileges")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            ApiError::NotAuthenticated => {
                (StatusCode::UNAUTHORIZED, "Not authenticated".to_string())
            }
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Insufficient privileges".to_string(),
            ),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
