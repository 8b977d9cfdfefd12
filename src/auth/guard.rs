use axum::{
    extract::{FromRef, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use super::claims::Identity;
use super::jwt::JwtKeys;
use crate::state::AppState;

pub const LOGIN_PAGE: &str = "/auth/login-page";
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

const PUBLIC_EXACT: &[&str] = &[
    LOGIN_PAGE,
    "/auth/login",
    "/auth/token",
    "/auth/register-page",
    "/auth/create",
    "/health",
    "/openapi.json",
    "/favicon.ico",
];

const PUBLIC_PREFIXES: &[&str] = &["/static", "/docs", "/redoc"];

/// Paths exempt from authentication: exact matches plus whole path
/// subtrees (`/static` matches `/static` and `/static/...`, not
/// `/staticfoo`).
pub fn is_public(path: &str) -> bool {
    if PUBLIC_EXACT.contains(&path) {
        return true;
    }
    PUBLIC_PREFIXES.iter().any(|pfx| {
        path.strip_prefix(pfx)
            .map_or(false, |rest| rest.is_empty() || rest.starts_with('/'))
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(token.to_string())
    } else {
        None
    }
}

/// Pulls the session token out of a request: the `Authorization` header
/// first, then the access-token cookie. First match wins. Cookie values
/// written as `Bearer <token>` are accepted too.
pub fn extract_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    bearer_token(headers).or_else(|| {
        jar.get(ACCESS_TOKEN_COOKIE).map(|c| {
            let v = c.value();
            v.strip_prefix("Bearer ").unwrap_or(v).to_string()
        })
    })
}

/// Validation outcome of whatever token the request carried.
#[derive(Debug, PartialEq)]
pub enum TokenState {
    Missing,
    Invalid,
    Valid(Identity),
}

/// Terminal outcome of the guard pipeline for one request.
#[derive(Debug, PartialEq)]
pub enum Decision {
    /// Allowlisted route; passes through untouched.
    Public,
    /// Token checked out; attach this identity.
    Authenticated(Identity),
    /// No usable token, but the target is the login page itself
    /// (loop protection; the allowlist normally decides first).
    Anonymous,
    /// Send the client to the login page.
    RedirectToLogin,
}

/// Ordered rule chain: allowlist, then token validity, then the login-page
/// loop check. Pure over its inputs.
pub fn decide(path: &str, token: TokenState) -> Decision {
    if is_public(path) {
        return Decision::Public;
    }
    match token {
        TokenState::Valid(identity) => Decision::Authenticated(identity),
        TokenState::Missing | TokenState::Invalid => {
            if path == LOGIN_PAGE {
                Decision::Anonymous
            } else {
                Decision::RedirectToLogin
            }
        }
    }
}

/// Request gate for every route. Public paths skip token handling
/// entirely; everything else either gets an `Identity` attached to the
/// request extensions or a see-other redirect to the login page.
pub async fn auth_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if is_public(&path) {
        return next.run(request).await;
    }

    let token_state = match extract_token(request.headers(), &jar) {
        None => TokenState::Missing,
        Some(token) => {
            let keys = JwtKeys::from_ref(&state);
            match keys.verify(&token) {
                Some(identity) => TokenState::Valid(identity),
                None => TokenState::Invalid,
            }
        }
    };

    match decide(&path, token_state) {
        Decision::Public | Decision::Anonymous => next.run(request).await,
        Decision::Authenticated(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Decision::RedirectToLogin => Redirect::to(LOGIN_PAGE).into_response(),
    }
}
