use serde::{Deserialize, Serialize};

use super::repo_types::User;

/// JSON body for user registration.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub role: String,
}

/// Form body shared by both login variants.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Bearer token response for API clients.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            is_active: user.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_serialization() {
        let response = PublicUser {
            id: 7,
            username: "alice".into(),
            email: "alice@example.com".into(),
            role: "user".into(),
            is_active: true,
        };
        let json = serde_json::to_string(&response).expect("serialize");
        assert!(json.contains("alice@example.com"));
        assert!(json.contains("\"id\":7"));
    }
}
