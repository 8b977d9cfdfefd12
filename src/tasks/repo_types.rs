use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Task record owned by a single user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub priority: i32,
    pub complete: bool,
    pub owner_id: i64,
}
