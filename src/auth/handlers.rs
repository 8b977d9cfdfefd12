use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{Html, Redirect},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use super::claims::Identity;
use super::dto::{CreateUserRequest, LoginForm, PublicUser, TokenResponse};
use super::extractors::CurrentUser;
use super::guard::{ACCESS_TOKEN_COOKIE, LOGIN_PAGE};
use super::jwt::JwtKeys;
use super::password::hash_password;
use super::repo_types::{NewUser, User};
use super::services::authenticate_user;
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login-page", get(login_page))
        .route("/auth/register-page", get(register_page))
        .route("/auth/create", post(create_user))
        .route("/auth/token", post(login_for_access_token))
        .route("/auth/login", post(login))
        .route("/auth/logout", get(logout))
        .route("/auth/me", get(me))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

async fn login_page() -> Html<&'static str> {
    Html(include_str!("../../templates/login.html"))
}

async fn register_page() -> Html<&'static str> {
    Html(include_str!("../../templates/register.html"))
}

#[instrument(skip(state, payload))]
async fn create_user(
    State(state): State<AppState>,
    Json(mut payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if payload.username.trim().is_empty() {
        return Err(ApiError::BadRequest("Username must not be empty".into()));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::BadRequest("Invalid email".into()));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::BadRequest("Password too short".into()));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }
    if User::find_by_username(&state.db, &payload.username)
        .await?
        .is_some()
    {
        warn!(username = %payload.username, "username already registered");
        return Err(ApiError::Conflict("Username already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        &NewUser {
            username: &payload.username,
            email: &payload.email,
            first_name: &payload.first_name,
            last_name: &payload.last_name,
            password_hash: &hash,
            role: &payload.role,
        },
    )
    .await?;

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(PublicUser::from(&user))))
}

/// Form login for API clients: returns a bearer token as JSON.
#[instrument(skip(state, form))]
async fn login_for_access_token(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = authenticate_user(&state.db, &form.username, &form.password)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user.username, user.id, &user.role)?;

    info!(user_id = user.id, username = %user.username, "token issued");
    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".into(),
    }))
}

/// Form login for browsers: stores the token in an http-only cookie so the
/// client sends it on every subsequent request, then redirects home.
#[instrument(skip(state, jar, form))]
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), ApiError> {
    let user = authenticate_user(&state.db, &form.username, &form.password)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user.username, user.id, &user.role)?;

    let cookie = Cookie::build((ACCESS_TOKEN_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(keys.ttl)
        .path("/")
        .build();

    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok((jar.add(cookie), Redirect::to("/")))
}

/// Clears this client's cookie only. A bearer copy extracted elsewhere
/// stays valid until it expires; the tokens are stateless.
#[instrument(skip(jar))]
async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let removal = Cookie::build(ACCESS_TOKEN_COOKIE).path("/").build();
    (jar.remove(removal), Redirect::to(LOGIN_PAGE))
}

#[instrument(skip_all)]
async fn me(CurrentUser(identity): CurrentUser) -> Json<Identity> {
    Json(identity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@nodot"));
        assert!(!is_valid_email("white space@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn token_response_serialization() {
        let response = TokenResponse {
            access_token: "tok".into(),
            token_type: "bearer".into(),
        };
        let json = serde_json::to_string(&response).expect("serialize");
        assert!(json.contains("\"access_token\":\"tok\""));
        assert!(json.contains("\"token_type\":\"bearer\""));
    }
}
