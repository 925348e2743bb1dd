//! Page gate for everything outside the verification page.
//!
//! Given the route category and the observed auth state, decide what a page
//! request gets: a loading shell, the sign-in/sign-up UI, the application
//! shell, or a navigation. The one redirect the edge guard can never see is
//! handled here: a user parked on an auth page whose session just became
//! authenticated is sent to their role dashboard, at most once per cool-down
//! window.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{error, warn};
use uuid::Uuid;

use crate::{
    guard::verify_location,
    identity::{AuthState, IdentityClient, RequestCookies, UserRole},
    routes::{self, RouteCategory, SignMode},
};

/// What the page handler should produce for a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Gate {
    /// Identity state not settled yet; show the loading shell.
    Loading,
    /// Serve the application shell for this path.
    RenderShell,
    /// Serve the sign-in/sign-up UI with the given mode pre-selected.
    RenderSignIn(SignMode),
    /// Client-side navigation to the given location.
    Navigate(String),
}

/// Re-entrancy guard for the post-sign-in redirect.
///
/// The identity service emits a burst of state-change notifications around a
/// single sign-in; without the cool-down each one would trigger another
/// navigation. Entries expire so a later, distinct sign-in by the same user
/// retriggers normally.
#[derive(Debug)]
pub struct RedirectGuard {
    cooldown: Duration,
    recent: Mutex<HashMap<Uuid, Instant>>,
}

impl RedirectGuard {
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            recent: Mutex::new(HashMap::new()),
        }
    }

    /// Claim the redirect for this user; false while one is still in flight.
    pub fn try_begin(&self, user_id: Uuid) -> bool {
        let now = Instant::now();
        let mut recent = self.recent.lock().unwrap_or_else(PoisonError::into_inner);
        recent.retain(|_, started| now.duration_since(*started) < self.cooldown);

        if recent.contains_key(&user_id) {
            return false;
        }
        recent.insert(user_id, now);
        true
    }
}

pub struct PageGate {
    identity: Arc<dyn IdentityClient>,
    redirects: RedirectGuard,
}

impl PageGate {
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityClient>, cooldown: Duration) -> Self {
        Self {
            identity,
            redirects: RedirectGuard::new(cooldown),
        }
    }

    /// Decide the gate outcome for one page request.
    pub async fn gate(&self, path: &str, cookies: &RequestCookies) -> Gate {
        let category = routes::categorize(path);

        let state = match self.identity.auth_state(cookies).await {
            Ok(state) => state,
            Err(err) => {
                // An unreachable identity service must not break public
                // pages; treat it as signed-out and let verification retry.
                warn!("Identity state lookup failed: {err:#}");
                AuthState::Unauthenticated
            }
        };

        // The verification page owns its own loading UI; everything else
        // shows ours while the client settles.
        if state == AuthState::Configuring && category != RouteCategory::Verification {
            return Gate::Loading;
        }

        match category {
            RouteCategory::Auth(mode) => {
                if let AuthState::Authenticated(user) = state {
                    if self.redirects.try_begin(user.id) {
                        let role = match self.identity.fetch_attributes(&user).await {
                            Ok(attributes) => attributes.role(),
                            Err(err) => {
                                error!(
                                    user = %user.email,
                                    "Post-sign-in role fetch failed, defaulting to attendee: {err:#}"
                                );
                                UserRole::Attendee
                            }
                        };
                        Gate::Navigate(role.dashboard().to_string())
                    } else {
                        // Another notification from the same sign-in burst;
                        // the navigation is already in flight.
                        Gate::Loading
                    }
                } else {
                    Gate::RenderSignIn(mode)
                }
            }
            RouteCategory::Verification => Gate::RenderShell,
            RouteCategory::Protected => {
                if matches!(state, AuthState::Authenticated(_)) {
                    Gate::RenderShell
                } else {
                    // The edge guard should have detoured this request; the
                    // signal cookie existed without a real session. Re-run
                    // verification instead of serving the shell.
                    warn!(path, "Protected page reached without a session");
                    Gate::Navigate(verify_location(path))
                }
            }
            RouteCategory::Public => Gate::RenderShell,
        }
    }
}
