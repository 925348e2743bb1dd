//! Fallback page handler and the HTML shells.
//!
//! The conference SPA itself is served by the application deployment; this
//! gateway only emits the thin shells the gate decides on: a loading view, a
//! sign-in/sign-up mount point, or the application shell that boots the SPA.

use axum::{
    extract::Extension,
    http::{HeaderMap, Uri},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use crate::{
    api::AppState,
    identity::RequestCookies,
    provider::Gate,
    routes::SignMode,
};

/// Serve whatever the page gate decides for this path.
pub async fn page(
    Extension(state): Extension<Arc<AppState>>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let cookies = RequestCookies::from_headers(&headers);

    match state.pages.gate(uri.path(), &cookies).await {
        Gate::Loading => Html(loading_shell("Loading...")).into_response(),
        Gate::RenderShell => Html(app_shell(uri.path())).into_response(),
        Gate::RenderSignIn(mode) => Html(signin_shell(mode)).into_response(),
        Gate::Navigate(location) => Redirect::to(&location).into_response(),
    }
}

/// Spinner page with a status line; used while identity state settles and as
/// the body of verification redirects.
#[must_use]
pub fn loading_shell(status_line: &str) -> String {
    shell(
        "Loading",
        &format!(
            r#"<div class="loading"><div class="spinner"></div><p>{}</p></div>"#,
            escape(status_line)
        ),
    )
}

/// Mount point for the identity provider's sign-in/sign-up UI.
fn signin_shell(mode: SignMode) -> String {
    let (title, initial) = match mode {
        SignMode::SignIn => ("Sign in", "signin"),
        SignMode::SignUp => ("Sign up", "signup"),
    };
    shell(
        title,
        &format!(r#"<div id="auth" data-initial-mode="{initial}"></div>"#),
    )
}

/// Boot page for the conference SPA.
fn app_shell(path: &str) -> String {
    shell(
        "Conferences",
        &format!(r#"<div id="app" data-path="{}"></div>"#, escape(path)),
    )
}

fn shell(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>{title}</title></head>
<body>{body}</body>
</html>
"#
    )
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_shell_carries_status_line() {
        let html = loading_shell("Confirming your session...");
        assert!(html.contains("Confirming your session..."));
        assert!(html.contains("spinner"));
    }

    #[test]
    fn signin_shell_preselects_mode() {
        assert!(signin_shell(SignMode::SignIn).contains(r#"data-initial-mode="signin""#));
        assert!(signin_shell(SignMode::SignUp).contains(r#"data-initial-mode="signup""#));
    }

    #[test]
    fn shells_escape_markup() {
        let html = app_shell("/x<script>");
        assert!(!html.contains("<script>"));
    }
}
