use serde::Deserialize;

use crate::error::ApiError;

/// Create/update payload for a task.
#[derive(Debug, Deserialize)]
pub struct TaskRequest {
    pub title: String,
    pub description: String,
    pub priority: i32,
    pub complete: bool,
}

impl TaskRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.title.len() < 3 {
            return Err(ApiError::BadRequest(
                "Title must be at least 3 characters".into(),
            ));
        }
        if self.description.len() < 3 || self.description.len() > 300 {
            return Err(ApiError::BadRequest(
                "Description must be 3 to 300 characters".into(),
            ));
        }
        if !(1..=9).contains(&self.priority) {
            return Err(ApiError::BadRequest(
                "Priority must be between 1 and 9".into(),
            ));
        }
        Ok(())
    }
}
