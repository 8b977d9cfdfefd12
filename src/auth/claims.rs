use serde::{Deserialize, Serialize};

/// JWT payload carried by a session token.
///
/// `sub` and `id` are optional on the wire; a signed-but-incomplete token
/// decodes here and is rejected during verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Option<String>, // username
    pub id: Option<i64>,     // user ID
    pub role: Option<String>,
    pub exp: usize, // expires at (unix timestamp)
}

/// Identity attached to a request once its token checks out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub role: String,
}
