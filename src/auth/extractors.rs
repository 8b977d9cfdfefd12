use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;

use super::claims::Identity;
use super::guard;
use super::jwt::JwtKeys;
use crate::error::ApiError;

/// Strict identity resolver: rejects with 401 when no valid token is
/// presented. API handlers use this instead of relying on the page-flow
/// redirects of the guard.
pub struct CurrentUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // The guard already validated the token for non-public routes and
        // left the identity in the extensions.
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(CurrentUser(identity.clone()));
        }

        let jar = CookieJar::from_headers(&parts.headers);
        let token =
            guard::extract_token(&parts.headers, &jar).ok_or(ApiError::NotAuthenticated)?;
        let keys = JwtKeys::from_ref(state);
        let identity = keys.verify(&token).ok_or(ApiError::NotAuthenticated)?;
        Ok(CurrentUser(identity))
    }
}

/// Silent variant of [`CurrentUser`]: any resolution failure becomes
/// `None` instead of a rejection. The landing page uses it to pick a view.
pub struct MaybeUser(pub Option<Identity>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let resolved = CurrentUser::from_request_parts(parts, state)
            .await
            .ok()
            .map(|user| user.0);
        Ok(MaybeUser(resolved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::http::{header, HeaderValue, Request};

    fn parts_with_auth(header_value: Option<&'static str>) -> Parts {
        let mut builder = Request::builder().uri("/tasks");
        if let Some(value) = header_value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (parts, ()) = builder.body(()).expect("request builds").into_parts();
        parts
    }

    #[tokio::test]
    async fn strict_resolver_rejects_missing_token() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(None);
        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("must reject");
        assert!(matches!(err, ApiError::NotAuthenticated));
    }

    #[tokio::test]
    async fn strict_resolver_rejects_garbage_token() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(Some("Bearer not.a.jwt"));
        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("must reject");
        assert!(matches!(err, ApiError::NotAuthenticated));
    }

    #[tokio::test]
    async fn strict_resolver_accepts_a_freshly_signed_token() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let token = keys.sign("alice", 7, "user").expect("sign");

        let mut builder = Request::builder().uri("/tasks");
        builder = builder.header(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).expect("header value"),
        );
        let (mut parts, ()) = builder.body(()).expect("request builds").into_parts();

        let CurrentUser(identity) = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .expect("must resolve");
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.user_id, 7);
    }

    #[tokio::test]
    async fn strict_resolver_prefers_the_guard_attached_identity() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(None);
        parts.extensions.insert(Identity {
            user_id: 3,
            username: "carol".into(),
            role: "user".into(),
        });
        let CurrentUser(identity) = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .expect("must resolve from extensions");
        assert_eq!(identity.username, "carol");
    }

    #[tokio::test]
    async fn silent_resolver_absorbs_failure() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(Some("Bearer not.a.jwt"));
        let MaybeUser(resolved) = MaybeUser::from_request_parts(&mut parts, &state)
            .await
            .expect("infallible");
        assert!(resolved.is_none());
    }
}
