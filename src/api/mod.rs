//! HTTP surface of the gateway.
//!
//! The router mounts the documented endpoints (`/health`, the verification
//! page) plus a fallback page handler that serves the shells; the edge guard
//! runs as middleware in front of everything.

use anyhow::Result;
use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Method, Request},
    middleware,
    response::Json,
    routing::get,
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{debug_span, info, Span};
use ulid::Ulid;
use utoipa::OpenApi;

use crate::{guard, routes};

pub mod handlers;
mod state;

pub use self::state::{AppConfig, AppState};

#[derive(OpenApi)]
#[openapi(
    paths(handlers::health::health, handlers::check::check),
    tags(
        (name = "gateway", description = "Conference platform edge auth gateway")
    )
)]
struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the gateway router around the shared state.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        // pages and probes are read-only
        .allow_methods([Method::GET])
        .allow_origin(Any);

    Router::new()
        .route("/health", get(handlers::health::health))
        .route(routes::VERIFY_PATH, get(handlers::check::check))
        .route("/openapi.json", get(openapi_json))
        .fallback(get(handlers::pages::page))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    guard::edge_guard,
                ))
                .layer(Extension(state)),
        )
}

/// Serve the gateway.
/// # Errors
/// Returns an error if the listener cannot bind or the server fails.
pub async fn new(port: u16, state: Arc<AppState>) -> Result<()> {
    let app = router(state);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let headers = request.headers();
    let path = request.uri().path();
    let request_id = headers
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", path, request_id)
}
