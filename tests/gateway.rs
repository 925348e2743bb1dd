//! End-to-end router tests: edge guard, verification page, and page gate
//! behavior against a scripted identity service.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{
        header::{COOKIE, LOCATION},
        Request, StatusCode,
    },
    Router,
};
use enirejo::{
    api::{self, AppConfig, AppState},
    check::CheckConfig,
    identity::{AuthState, IdentityClient, RequestCookies, User, UserAttributes},
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

struct StaticIdentity {
    state: AuthState,
    role: Option<&'static str>,
    attribute_calls: AtomicUsize,
}

impl StaticIdentity {
    fn new(state: AuthState) -> Self {
        Self {
            state,
            role: Some("attendee"),
            attribute_calls: AtomicUsize::new(0),
        }
    }

    fn with_role(mut self, role: &'static str) -> Self {
        self.role = Some(role);
        self
    }
}

#[async_trait]
impl IdentityClient for StaticIdentity {
    async fn auth_state(&self, _cookies: &RequestCookies) -> Result<AuthState> {
        Ok(self.state.clone())
    }

    async fn fetch_attributes(&self, _user: &User) -> Result<UserAttributes> {
        self.attribute_calls.fetch_add(1, Ordering::SeqCst);
        match self.role {
            Some(role) => Ok(UserAttributes {
                role: Some(role.to_string()),
            }),
            None => Err(anyhow!("attributes endpoint unavailable")),
        }
    }
}

fn user() -> User {
    User {
        id: Uuid::new_v4(),
        email: "jane@example.com".to_string(),
    }
}

fn app(identity: Arc<StaticIdentity>) -> Router {
    let config = AppConfig::new().with_check(CheckConfig {
        settle_interval: Duration::from_millis(1),
        settle_attempts: 3,
        error_delay: Duration::ZERO,
    });
    api::router(Arc::new(AppState::new(config, identity)))
}

async fn get(router: Router, uri: &str, cookies: Option<&str>) -> Result<axum::response::Response> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookies) = cookies {
        builder = builder.header(COOKIE, cookies);
    }
    let request = builder.body(Body::empty())?;
    router.oneshot(request).await.map_err(|err| anyhow!("{err}"))
}

fn location(response: &axum::response::Response) -> Result<String> {
    Ok(response
        .headers()
        .get(LOCATION)
        .context("missing Location header")?
        .to_str()?
        .to_string())
}

#[tokio::test]
async fn protected_path_without_cookies_detours_through_verification() -> Result<()> {
    let identity = Arc::new(StaticIdentity::new(AuthState::Unauthenticated));
    let response = get(app(identity), "/organizer/conferences", None).await?;

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&response)?,
        "/auth/check?redirect=%2Forganizer%2Fconferences"
    );
    Ok(())
}

#[tokio::test]
async fn bypassed_paths_never_redirect_regardless_of_cookies() -> Result<()> {
    let identity = Arc::new(StaticIdentity::new(AuthState::Unauthenticated));
    let router = app(identity);

    for uri in ["/api/conferences", "/assets/app.js", "/favicon.ico"] {
        let response = get(router.clone(), uri, None).await?;
        assert_eq!(response.status(), StatusCode::OK, "unexpected redirect for {uri}");
        assert!(response.headers().get(LOCATION).is_none());
    }
    Ok(())
}

#[tokio::test]
async fn guard_allows_protected_path_with_id_token_cookie() -> Result<()> {
    let identity = Arc::new(StaticIdentity::new(AuthState::Authenticated(user())));
    let response = get(
        app(identity),
        "/attendee/dashboard",
        Some("enirejo.jane.idToken=opaque"),
    )
    .await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn verification_sends_organizer_to_their_own_dashboard() -> Result<()> {
    let identity =
        Arc::new(StaticIdentity::new(AuthState::Authenticated(user())).with_role("organizer"));
    let response = get(
        app(identity),
        "/auth/check?redirect=%2Fattendee%2Fdashboard",
        Some("enirejo.jane.idToken=opaque"),
    )
    .await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response)?, "/organizer/dashboard");
    Ok(())
}

#[tokio::test]
async fn verification_resumes_matching_intent_unchanged() -> Result<()> {
    let identity =
        Arc::new(StaticIdentity::new(AuthState::Authenticated(user())).with_role("attendee"));
    let response = get(
        app(identity),
        "/auth/check?redirect=%2Fattendee%2Fconferences%2F42",
        Some("enirejo.jane.idToken=opaque"),
    )
    .await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response)?, "/attendee/conferences/42");
    Ok(())
}

#[tokio::test]
async fn verification_without_session_goes_to_signin() -> Result<()> {
    let identity = Arc::new(StaticIdentity::new(AuthState::Unauthenticated));
    let response = get(
        app(identity.clone()),
        "/auth/check?redirect=%2Fattendee%2Fdashboard",
        None,
    )
    .await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response)?, "/signin");
    assert_eq!(identity.attribute_calls.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn signin_page_redirects_once_after_authentication() -> Result<()> {
    let identity =
        Arc::new(StaticIdentity::new(AuthState::Authenticated(user())).with_role("organizer"));
    let router = app(identity.clone());
    let cookies = Some("enirejo.jane.idToken=opaque");

    let first = get(router.clone(), "/signin", cookies).await?;
    assert_eq!(first.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&first)?, "/organizer/dashboard");

    // Duplicate notification inside the cool-down window: no second redirect.
    let second = get(router, "/signin", cookies).await?;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(identity.attribute_calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn role_fetch_failure_falls_back_to_attendee_dashboard() -> Result<()> {
    let mut identity = StaticIdentity::new(AuthState::Authenticated(user()));
    identity.role = None;
    let response = get(app(Arc::new(identity)), "/signin", Some("x=1")).await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response)?, "/attendee/dashboard");
    Ok(())
}

#[tokio::test]
async fn stale_cookie_on_protected_page_is_sent_back_to_verification() -> Result<()> {
    // The auth signal exists but the identity service has no session: the
    // guard lets it through and the page gate re-runs verification.
    let identity = Arc::new(StaticIdentity::new(AuthState::Unauthenticated));
    let response = get(
        app(identity),
        "/organizer/dashboard",
        Some("enirejo.jane.idToken=expired"),
    )
    .await?;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response)?,
        "/auth/check?redirect=%2Forganizer%2Fdashboard"
    );
    Ok(())
}

#[tokio::test]
async fn health_is_always_reachable() -> Result<()> {
    let identity = Arc::new(StaticIdentity::new(AuthState::Unauthenticated));
    let response = get(app(identity), "/health", None).await?;

    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}
