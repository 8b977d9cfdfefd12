use sqlx::PgPool;
use tracing::warn;

use super::password::verify_password;
use super::repo_types::User;

/// Resolves a username/password pair to the stored user. Unknown usernames
/// and failed verifications both come back as `Ok(None)`, so the caller
/// cannot tell the two apart; only database faults surface as errors.
pub async fn authenticate_user(
    db: &PgPool,
    username: &str,
    password: &str,
) -> anyhow::Result<Option<User>> {
    let Some(user) = User::find_by_username(db, username).await? else {
        return Ok(None);
    };
    if !verify_password(password, &user.password_hash) {
        warn!(username, "password verification failed");
        return Ok(None);
    }
    Ok(Some(user))
}
