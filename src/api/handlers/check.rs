//! Verification page handler.
//!
//! The page itself never shows content; it resolves the real auth state, then
//! answers with a redirect whose body is the loading shell carrying the final
//! status line, so the brief moment before the browser follows `Location`
//! still shows a spinner.

use axum::{
    extract::{Extension, Query},
    http::{header::LOCATION, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::IntoParams;

use super::pages::loading_shell;
use crate::{api::AppState, check, identity::RequestCookies, routes};

#[derive(Debug, Deserialize, IntoParams)]
pub struct CheckParams {
    /// Originally requested path, carried over by the edge guard.
    redirect: Option<String>,
}

#[utoipa::path(
    get,
    path = "/auth/check",
    params(CheckParams),
    responses(
        (status = 303, description = "Redirects to the resolved destination")
    ),
    tag = "gateway",
)]
/// Resolve auth state and role, then issue exactly one terminal redirect.
#[instrument(skip(state, headers))]
pub async fn check(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<CheckParams>,
    headers: HeaderMap,
) -> Response {
    let cookies = RequestCookies::from_headers(&headers);
    let intent = params
        .redirect
        .as_deref()
        .and_then(routes::sanitize_redirect);

    let outcome = check::resolve(
        state.identity.as_ref(),
        &cookies,
        intent,
        state.config.check(),
    )
    .await;

    transit(&outcome.location, outcome.state.status_line())
}

/// See-other redirect whose body is still the loading shell.
fn transit(location: &str, status_line: &str) -> Response {
    let mut response =
        (StatusCode::SEE_OTHER, Html(loading_shell(status_line))).into_response();
    if let Ok(value) = location.parse() {
        response.headers_mut().insert(LOCATION, value);
    }
    response
}
