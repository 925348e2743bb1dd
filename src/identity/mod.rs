//! Identity service types and client abstraction.
//!
//! The identity service owns sessions and user attributes; this gateway only
//! observes them. `AuthState` is the tri-state the rest of the crate branches
//! on, and `IdentityClient` is the seam the HTTP client and test doubles
//! implement.

use async_trait::async_trait;
use axum::http::{header::COOKIE, HeaderMap};
use serde::Deserialize;
use uuid::Uuid;

pub mod http;
pub use self::http::HttpIdentityClient;

/// Client-observed authentication status.
///
/// `Configuring` means the identity service has not yet settled for this
/// session (token refresh in flight); callers must not treat it as terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthState {
    Configuring,
    Authenticated(User),
    Unauthenticated,
}

/// Minimal user identity carried through the gating flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
}

/// Role attribute resolved after authentication.
///
/// `Admin` has no dashboard namespace of its own and coalesces to the
/// attendee dashboard, the same rule applied when the attribute is absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserRole {
    Organizer,
    Attendee,
    Admin,
}

impl UserRole {
    /// Parse a role attribute value, defaulting to `Attendee` for anything
    /// unrecognized or missing.
    #[must_use]
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
            Some("organizer") => Self::Organizer,
            Some("admin") => Self::Admin,
            _ => Self::Attendee,
        }
    }

    /// Dashboard namespace this role belongs to.
    #[must_use]
    pub const fn dashboard_prefix(self) -> &'static str {
        match self {
            Self::Organizer => crate::routes::ORGANIZER_PREFIX,
            Self::Attendee | Self::Admin => crate::routes::ATTENDEE_PREFIX,
        }
    }

    /// Landing page for this role.
    #[must_use]
    pub const fn dashboard(self) -> &'static str {
        match self {
            Self::Organizer => "/organizer/dashboard",
            Self::Attendee | Self::Admin => "/attendee/dashboard",
        }
    }
}

/// User attributes returned by the identity service.
#[derive(Clone, Debug, Deserialize)]
pub struct UserAttributes {
    pub role: Option<String>,
}

impl UserAttributes {
    #[must_use]
    pub fn role(&self) -> UserRole {
        UserRole::from_attribute(self.role.as_deref())
    }
}

/// Cookie material from an inbound request, kept raw so it can be both
/// scanned for the auth signal and forwarded verbatim to the identity
/// service.
#[derive(Clone, Debug, Default)]
pub struct RequestCookies {
    raw: String,
}

impl RequestCookies {
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let raw = headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect::<Vec<_>>()
            .join("; ");
        Self { raw }
    }

    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.trim().is_empty()
    }

    /// Iterate cookie names; malformed pairs are skipped.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.raw.split(';').filter_map(|pair| {
            let trimmed = pair.trim();
            let mut parts = trimmed.splitn(2, '=');
            let key = parts.next()?.trim();
            parts.next()?;
            if key.is_empty() {
                None
            } else {
                Some(key)
            }
        })
    }
}

/// Read-only view of the identity service.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Resolve the current auth state for the session cookies presented.
    async fn auth_state(&self, cookies: &RequestCookies) -> anyhow::Result<AuthState>;

    /// Fetch the authenticated user's attributes (at least the role).
    async fn fetch_attributes(&self, user: &User) -> anyhow::Result<UserAttributes>;
}
