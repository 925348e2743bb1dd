use clap::{Arg, Command};

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("identity-url")
                .long("identity-url")
                .help("Base URL of the identity service")
                .env("ENIREJO_IDENTITY_URL")
                .required(true),
        )
        .arg(
            Arg::new("identity-api-key")
                .long("identity-api-key")
                .help("Service API key presented to the identity service")
                .env("ENIREJO_IDENTITY_API_KEY"),
        )
        .arg(
            Arg::new("cookie-prefix")
                .long("cookie-prefix")
                .help("Prefix of the identity provider cookies checked at the edge")
                .default_value("enirejo")
                .env("ENIREJO_COOKIE_PREFIX"),
        )
}
