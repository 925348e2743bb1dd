use crate::{
    api::{self, AppConfig, AppState},
    cli::telemetry,
    identity::HttpIdentityClient,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub identity_url: Url,
    pub identity_api_key: Option<SecretString>,
    pub cookie_prefix: String,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the identity client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let identity = HttpIdentityClient::new(args.identity_url, args.identity_api_key)
        .context("Could not build identity client")?;

    let config = AppConfig::new().with_cookie_prefix(args.cookie_prefix);
    let state = Arc::new(AppState::new(config, Arc::new(identity)));

    let result = api::new(args.port, state).await;
    telemetry::shutdown_tracer();
    result
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("identity_url", args.identity_url.to_string()),
        (
            "identity_api_key_set",
            args.identity_api_key.is_some().to_string(),
        ),
        ("cookie_prefix", args.cookie_prefix.clone()),
    ];
    for (key, value) in entries {
        tracing::info!("{key}: {value}");
    }
}
