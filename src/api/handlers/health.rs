use axum::{
    http::{HeaderMap, HeaderValue},
    response::{IntoResponse, Json},
};
use serde_json::json;
use tracing::debug;

use crate::GIT_COMMIT_HASH;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Gateway is alive")
    ),
    tag = "gateway",
)]
/// Report gateway liveness with build identification.
pub async fn health() -> impl IntoResponse {
    let body = Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "build": GIT_COMMIT_HASH,
    }));

    let short_hash = if GIT_COMMIT_HASH.len() > 7 {
        &GIT_COMMIT_HASH[0..7]
    } else {
        ""
    };

    let mut headers = HeaderMap::new();
    match format!(
        "{}:{}:{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_hash
    )
    .parse::<HeaderValue>()
    {
        Ok(value) => {
            headers.insert("X-App", value);
        }
        Err(err) => debug!("Failed to parse X-App header: {err}"),
    }

    (headers, body)
}

#[cfg(test)]
mod tests {
    use super::health;
    use anyhow::{Context, Result};
    use axum::{body::to_bytes, response::IntoResponse};

    #[tokio::test]
    async fn health_reports_name_version_and_header() -> Result<()> {
        let response = health().await.into_response();

        let x_app = response
            .headers()
            .get("X-App")
            .context("missing X-App header")?
            .to_str()?
            .to_string();
        assert!(x_app.starts_with(env!("CARGO_PKG_NAME")));

        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body: serde_json::Value = serde_json::from_slice(&bytes)?;
        assert_eq!(body["name"], env!("CARGO_PKG_NAME"));
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["build"].is_string());

        Ok(())
    }
}
