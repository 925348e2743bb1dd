use crate::cli::actions::{server::Args, Action};
use anyhow::{Context, Result};
use secrecy::SecretString;
use url::Url;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    // Validate the identity URL scheme before parsing
    crate::cli::commands::validate(matches).map_err(|e| anyhow::anyhow!(e))?;

    let identity_url = matches
        .get_one::<String>("identity-url")
        .cloned()
        .context("missing required argument: --identity-url")?;
    let identity_url = Url::parse(&identity_url).context("invalid ENIREJO_IDENTITY_URL")?;

    let identity_api_key = matches
        .get_one::<String>("identity-api-key")
        .cloned()
        .map(SecretString::from);

    let cookie_prefix = matches
        .get_one::<String>("cookie-prefix")
        .cloned()
        .unwrap_or_else(|| "enirejo".to_string());

    Ok(Action::Server(Args {
        port,
        identity_url,
        identity_api_key,
        cookie_prefix,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn builds_server_action_from_matches() -> Result<()> {
        let matches = commands::new().get_matches_from(vec![
            "enirejo",
            "--port",
            "8088",
            "--identity-url",
            "https://identity.example.dev/",
            "--cookie-prefix",
            "confplat",
        ]);

        let Action::Server(args) = handler(&matches)?;
        assert_eq!(args.port, 8088);
        assert_eq!(args.identity_url.as_str(), "https://identity.example.dev/");
        assert_eq!(args.cookie_prefix, "confplat");
        assert!(args.identity_api_key.is_none());
        Ok(())
    }

    #[test]
    fn rejects_invalid_identity_url() {
        let matches = commands::new().get_matches_from(vec![
            "enirejo",
            "--identity-url",
            "ftp://identity.example.dev",
        ]);

        assert!(handler(&matches).is_err());
    }
}
