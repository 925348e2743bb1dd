//! Route taxonomy for the gateway.
//!
//! Paths fall into four mutually exclusive categories, checked in precedence
//! order: auth pages, the verification page, the protected dashboard
//! namespaces, and everything else (public). The edge guard additionally
//! bypasses API, asset, and file-extension paths entirely.

use regex::Regex;

/// Neutral, always-accessible page that resolves real auth state.
pub const VERIFY_PATH: &str = "/auth/check";

pub const SIGNIN_PATH: &str = "/signin";
pub const SIGNUP_PATH: &str = "/signup";

pub const ORGANIZER_PREFIX: &str = "/organizer";
pub const ATTENDEE_PREFIX: &str = "/attendee";

/// Destination when no redirect intent was carried through verification.
pub const DEFAULT_DASHBOARD: &str = "/attendee/dashboard";

/// Query parameter carrying the originally requested path.
pub const REDIRECT_PARAM: &str = "redirect";

const API_PREFIX: &str = "/api";
const ASSET_PREFIXES: [&str; 2] = ["/assets", "/static"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignMode {
    SignIn,
    SignUp,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteCategory {
    /// Sign-in / sign-up pages with the pre-selected mode.
    Auth(SignMode),
    /// The verification page, which owns its own gating and loading UI.
    Verification,
    /// Role-scoped dashboard namespaces subject to the edge guard.
    Protected,
    Public,
}

/// Classify a path, honoring the precedence auth > verification > protected.
#[must_use]
pub fn categorize(path: &str) -> RouteCategory {
    if path == SIGNIN_PATH {
        return RouteCategory::Auth(SignMode::SignIn);
    }
    if path == SIGNUP_PATH {
        return RouteCategory::Auth(SignMode::SignUp);
    }
    if path == VERIFY_PATH {
        return RouteCategory::Verification;
    }
    if is_protected(path) {
        return RouteCategory::Protected;
    }
    RouteCategory::Public
}

/// True when the path lives under one of the role dashboard namespaces.
#[must_use]
pub fn is_protected(path: &str) -> bool {
    under_prefix(path, ORGANIZER_PREFIX) || under_prefix(path, ATTENDEE_PREFIX)
}

/// Paths the edge guard always lets through: API namespaces, asset
/// namespaces, anything with a file extension, and the verification page.
#[must_use]
pub fn is_bypassed(path: &str) -> bool {
    if path == VERIFY_PATH || under_prefix(path, API_PREFIX) {
        return true;
    }
    if ASSET_PREFIXES
        .iter()
        .any(|prefix| under_prefix(path, prefix))
    {
        return true;
    }
    // File-extension heuristic: favicon.ico, robots.txt, bundles, etc.
    path.contains('.')
}

/// Segment-aware prefix match: `/attendee` and `/attendee/...`, never
/// `/attendees`.
fn under_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Validate an inbound `redirect` query value.
///
/// Returns `None` for anything that is not a plain in-app path, in which case
/// callers fall back to [`DEFAULT_DASHBOARD`].
#[must_use]
pub fn sanitize_redirect(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    // Page paths only: a single leading slash, path segments, an optional
    // query. No dots, so `..` traversal and scheme-bearing values are
    // rejected; no second leading slash, so the verification page cannot be
    // turned into an open redirector.
    let valid = Regex::new(r"^/[A-Za-z0-9_\-][A-Za-z0-9_\-/]*(\?[A-Za-z0-9_\-=&%]*)?$")
        .is_ok_and(|re| re.is_match(trimmed));
    if valid {
        Some(trimmed.to_string())
    } else {
        None
    }
}
