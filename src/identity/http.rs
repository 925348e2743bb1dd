//! HTTP client for the external identity service.
//!
//! Session state is resolved by replaying the browser's cookies against
//! `GET /v1/session`; role attributes come from
//! `GET /v1/users/{id}/attributes`. Both calls are authenticated to the
//! identity service with an optional service API key.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use axum::http::header::COOKIE;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use super::{AuthState, IdentityClient, RequestCookies, User, UserAttributes};
use crate::APP_USER_AGENT;

#[derive(Debug, Deserialize)]
struct SessionResponse {
    user_id: Uuid,
    email: String,
}

pub struct HttpIdentityClient {
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
}

impl HttpIdentityClient {
    /// Build a client with the gateway user agent.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(base_url: Url, api_key: Option<SecretString>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .context("Error creating identity HTTP client")?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid identity endpoint path: {path}"))
    }

    fn request(&self, url: Url) -> reqwest::RequestBuilder {
        let mut builder = self.client.get(url);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }
        builder
    }
}

#[async_trait]
impl IdentityClient for HttpIdentityClient {
    async fn auth_state(&self, cookies: &RequestCookies) -> Result<AuthState> {
        // No cookies at all cannot resolve to a session; skip the round trip.
        if cookies.is_empty() {
            return Ok(AuthState::Unauthenticated);
        }

        let url = self.endpoint("/v1/session")?;
        let response = self
            .request(url)
            .header(COOKIE, cookies.raw())
            .send()
            .await
            .context("Failed to query identity session")?;

        match response.status() {
            StatusCode::OK => {
                let session: SessionResponse = response
                    .json()
                    .await
                    .context("Invalid session response body")?;
                Ok(AuthState::Authenticated(User {
                    id: session.user_id,
                    email: session.email,
                }))
            }
            StatusCode::NO_CONTENT => Ok(AuthState::Unauthenticated),
            // The identity service answers 202 while a token refresh is still
            // settling for this session.
            StatusCode::ACCEPTED => Ok(AuthState::Configuring),
            status => bail!("Unexpected identity session status: {status}"),
        }
    }

    async fn fetch_attributes(&self, user: &User) -> Result<UserAttributes> {
        let url = self.endpoint(&format!("/v1/users/{}/attributes", user.id))?;
        let response = self
            .request(url)
            .send()
            .await
            .context("Failed to fetch user attributes")?;

        if !response.status().is_success() {
            bail!("Unexpected attributes status: {}", response.status());
        }

        response
            .json::<UserAttributes>()
            .await
            .context("Invalid attributes response body")
    }
}
