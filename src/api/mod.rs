use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    Extension, Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use utoipa_axum::router::OpenApiRouter;

pub mod handlers;
// OpenAPI router wiring and route registration live in openapi.rs.
mod openapi;
pub(crate) mod pages;

pub use handlers::auth::{AuthConfig, AuthState};
pub use openapi::openapi;

/// Build the API router with all documented routes registered.
#[must_use]
pub fn router() -> OpenApiRouter {
    openapi::api_router()
}

/// Build the application with its middleware and injected dependencies.
///
/// The pool and auth state are created once by the caller and shared by every request.
pub fn app(pool: SqlitePool, auth_state: Arc<AuthState>) -> Router {
    let (router, _openapi) = router().split_for_parts();
    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(Extension(auth_state))
            .layer(Extension(pool)),
    )
}

/// Start the server and serve until a shutdown signal arrives.
/// # Errors
/// Return error if failed to bind or serve
pub async fn new(port: u16, pool: SqlitePool, auth_config: AuthConfig) -> Result<()> {
    let auth_state = Arc::new(AuthState::new(auth_config));
    let app = app(pool, auth_state);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gracefully shutdown");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
