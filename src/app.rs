use std::net::SocketAddr;

use axum::{
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{extractors::MaybeUser, guard};
use crate::state::AppState;
use crate::{admin, auth, tasks, users};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(|| async { "ok" }))
        .merge(auth::router())
        .merge(tasks::router())
        .merge(users::router())
        .merge(admin::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            guard::auth_guard,
        ))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

/// Landing page: the silent resolver decides which view to render.
async fn index(MaybeUser(user): MaybeUser) -> Response {
    match user {
        Some(identity) => Html(format!(
            include_str!("../templates/index.html"),
            username = identity.username
        ))
        .into_response(),
        None => Redirect::to(guard::LOGIN_PAGE).into_response(),
    }
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
