//! Verification (auth-check) flow.
//!
//! The verification page is a pure transit point: it waits for the identity
//! service to settle, resolves the role once, and ends in exactly one
//! redirect. The page body is only ever a loading indicator whose status line
//! tracks [`CheckState`].
//!
//! State machine:
//!
//! ```text
//! WaitingForClient -> Unauthenticated               (settled, no user)
//! WaitingForClient -> ResolvingRole                 (settled, user present)
//! ResolvingRole    -> RedirectingWrongDashboard     (role prefix != intent prefix)
//! ResolvingRole    -> RedirectingCorrectDestination (role prefix == intent prefix)
//! *                -> Error                         (identity lookup failed)
//! ```

use std::time::Duration;
use tracing::{info, warn};

use crate::{
    identity::{AuthState, IdentityClient, RequestCookies, UserRole},
    routes::{DEFAULT_DASHBOARD, SIGNIN_PATH},
};

/// Where the verification flow is in its lifecycle; each state carries the
/// status line shown in the loading shell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckState {
    WaitingForClient,
    Unauthenticated,
    ResolvingRole,
    RedirectingWrongDashboard,
    RedirectingCorrectDestination,
    Error,
}

impl CheckState {
    #[must_use]
    pub const fn status_line(self) -> &'static str {
        match self {
            Self::WaitingForClient => "Confirming your session...",
            Self::Unauthenticated => "No active session, taking you to sign-in...",
            Self::ResolvingRole => "Loading your profile...",
            Self::RedirectingWrongDashboard => "Taking you to your dashboard...",
            Self::RedirectingCorrectDestination => "Resuming where you left off...",
            Self::Error => "Something went wrong, taking you to sign-in...",
        }
    }
}

/// Terminal redirect produced by one verification pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckOutcome {
    pub state: CheckState,
    pub location: String,
}

/// Tunables for the settle wait and the error detour.
#[derive(Clone, Debug)]
pub struct CheckConfig {
    /// Interval between auth-state polls while the client is configuring.
    pub settle_interval: Duration,
    /// How many polls to attempt before giving up on a terminal state.
    pub settle_attempts: u32,
    /// Pause before the error redirect so the status line is visible.
    pub error_delay: Duration,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            settle_interval: Duration::from_millis(150),
            settle_attempts: 20,
            error_delay: Duration::from_millis(1200),
        }
    }
}

/// Resolve authoritative auth state and role, producing one redirect.
///
/// The role is fetched at most once per call; repeated polls of the auth
/// state never repeat the attributes lookup. A failed attributes fetch is
/// recovered by defaulting to the attendee role, while a failed session
/// lookup is the error branch: log, short delay, sign-in.
pub async fn resolve(
    identity: &dyn IdentityClient,
    cookies: &RequestCookies,
    intent: Option<String>,
    config: &CheckConfig,
) -> CheckOutcome {
    info!("{}", CheckState::WaitingForClient.status_line());

    let user = match settle(identity, cookies, config).await {
        Ok(AuthState::Authenticated(user)) => user,
        Ok(AuthState::Unauthenticated | AuthState::Configuring) => {
            // The original intent is discarded here; after a fresh sign-in
            // the user lands on their role dashboard instead.
            info!("{}", CheckState::Unauthenticated.status_line());
            return CheckOutcome {
                state: CheckState::Unauthenticated,
                location: SIGNIN_PATH.to_string(),
            };
        }
        Err(err) => {
            warn!("Verification failed to resolve auth state: {err:#}");
            tokio::time::sleep(config.error_delay).await;
            return CheckOutcome {
                state: CheckState::Error,
                location: SIGNIN_PATH.to_string(),
            };
        }
    };

    info!("{}", CheckState::ResolvingRole.status_line());
    let role = match identity.fetch_attributes(&user).await {
        Ok(attributes) => attributes.role(),
        Err(err) => {
            warn!(
                user = %user.email,
                "Role fetch failed, defaulting to attendee: {err:#}"
            );
            UserRole::Attendee
        }
    };

    let intent = intent.unwrap_or_else(|| DEFAULT_DASHBOARD.to_string());

    if intent_matches_role(&intent, role) {
        CheckOutcome {
            state: CheckState::RedirectingCorrectDestination,
            location: intent,
        }
    } else {
        info!(
            role = role.dashboard_prefix(),
            %intent,
            "Redirect intent belongs to the other dashboard"
        );
        CheckOutcome {
            state: CheckState::RedirectingWrongDashboard,
            location: role.dashboard().to_string(),
        }
    }
}

/// Poll the identity service until the auth state leaves `Configuring`.
///
/// Gives up after the configured number of attempts and reports the last
/// observed state; the caller treats a still-configuring result as
/// unauthenticated rather than blocking forever.
async fn settle(
    identity: &dyn IdentityClient,
    cookies: &RequestCookies,
    config: &CheckConfig,
) -> anyhow::Result<AuthState> {
    let mut state = identity.auth_state(cookies).await?;
    let mut attempts = 0;

    while state == AuthState::Configuring && attempts < config.settle_attempts {
        tokio::time::sleep(config.settle_interval).await;
        state = identity.auth_state(cookies).await?;
        attempts += 1;
    }

    Ok(state)
}

/// Does the intent path live under the role's own dashboard namespace?
fn intent_matches_role(intent: &str, role: UserRole) -> bool {
    let prefix = role.dashboard_prefix();
    intent == prefix
        || intent
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('?'))
}
