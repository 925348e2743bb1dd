//! Gateway configuration and shared request state.

use std::sync::Arc;
use std::time::Duration;

use crate::{check::CheckConfig, guard::GuardPolicy, identity::IdentityClient, provider::PageGate};

const DEFAULT_COOKIE_PREFIX: &str = "enirejo";
const DEFAULT_REDIRECT_COOLDOWN: Duration = Duration::from_secs(2);

#[derive(Clone, Debug)]
pub struct AppConfig {
    cookie_prefix: String,
    redirect_cooldown: Duration,
    check: CheckConfig,
}

impl AppConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cookie_prefix: DEFAULT_COOKIE_PREFIX.to_string(),
            redirect_cooldown: DEFAULT_REDIRECT_COOLDOWN,
            check: CheckConfig::default(),
        }
    }

    #[must_use]
    pub fn with_cookie_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cookie_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_redirect_cooldown(mut self, cooldown: Duration) -> Self {
        self.redirect_cooldown = cooldown;
        self
    }

    #[must_use]
    pub fn with_check(mut self, check: CheckConfig) -> Self {
        self.check = check;
        self
    }

    #[must_use]
    pub fn cookie_prefix(&self) -> &str {
        &self.cookie_prefix
    }

    #[must_use]
    pub fn check(&self) -> &CheckConfig {
        &self.check
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared state threaded through the router as an `Extension`.
pub struct AppState {
    pub config: AppConfig,
    pub policy: GuardPolicy,
    pub identity: Arc<dyn IdentityClient>,
    pub pages: PageGate,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, identity: Arc<dyn IdentityClient>) -> Self {
        let policy = GuardPolicy::new(config.cookie_prefix());
        let pages = PageGate::new(identity.clone(), config.redirect_cooldown);
        Self {
            config,
            policy,
            identity,
            pages,
        }
    }
}
