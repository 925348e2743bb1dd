//! Edge route guard.
//!
//! Runs before any page handler and decides `allow` or
//! `redirect-to-verification` from cookie presence alone. Presence of a
//! recognized identity cookie lets the request through optimistically; the
//! guard never validates tokens. Missing cookies cost only a detour through
//! the verification page, which re-validates, so this stage is deliberately
//! fail-open.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use regex::Regex;
use std::sync::Arc;
use tracing::debug;
use url::form_urlencoded;

use crate::{
    api::AppState,
    identity::RequestCookies,
    routes::{self, REDIRECT_PARAM, VERIFY_PATH},
};

/// Outcome of the cookie-presence check for a single request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Detour through the verification page, carrying the original path.
    Verify { redirect: String },
}

/// Pure `(path, cookie-set) -> allow|verify` policy.
#[derive(Clone, Debug)]
pub struct GuardPolicy {
    cookie_prefix: String,
    hosted_signin_cookie: String,
}

impl GuardPolicy {
    #[must_use]
    pub fn new(cookie_prefix: impl Into<String>) -> Self {
        let cookie_prefix = cookie_prefix.into();
        let hosted_signin_cookie = format!("{cookie_prefix}-signin-with-hosted-ui");
        Self {
            cookie_prefix,
            hosted_signin_cookie,
        }
    }

    /// True when either recognized identity cookie is present.
    ///
    /// Recognized names are the per-user ID token cookie
    /// (`{prefix}.{user}.idToken`) and the hosted sign-in marker
    /// (`{prefix}-signin-with-hosted-ui`). Presence only; validity and expiry
    /// are the verification page's concern.
    #[must_use]
    pub fn has_auth_signal(&self, cookies: &RequestCookies) -> bool {
        let id_token = Regex::new(&format!(
            r"^{}\.[^.]+\.idToken$",
            regex::escape(&self.cookie_prefix)
        ));
        cookies.names().any(|name| {
            name == self.hosted_signin_cookie
                || id_token.as_ref().is_ok_and(|re| re.is_match(name))
        })
    }

    #[must_use]
    pub fn decide(&self, path: &str, cookies: &RequestCookies) -> GuardDecision {
        if routes::is_bypassed(path) || !routes::is_protected(path) {
            return GuardDecision::Allow;
        }
        if self.has_auth_signal(cookies) {
            return GuardDecision::Allow;
        }
        GuardDecision::Verify {
            redirect: path.to_string(),
        }
    }
}

/// Location of the verification page with the redirect intent attached.
#[must_use]
pub fn verify_location(redirect: &str) -> String {
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair(REDIRECT_PARAM, redirect)
        .finish();
    format!("{VERIFY_PATH}?{query}")
}

/// axum middleware applying [`GuardPolicy`] to every inbound request.
pub async fn edge_guard(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let cookies = RequestCookies::from_headers(request.headers());

    match state.policy.decide(&path, &cookies) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Verify { redirect } => {
            debug!(%path, "No auth signal, detouring through verification");
            Redirect::temporary(&verify_location(&redirect)).into_response()
        }
    }
}
