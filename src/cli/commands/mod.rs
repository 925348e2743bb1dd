mod identity;
pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

/// Validate argument combinations clap cannot express alone.
///
/// # Errors
/// Returns an error string if the identity URL does not use http(s).
pub fn validate(matches: &clap::ArgMatches) -> Result<(), String> {
    let Some(url) = matches.get_one::<String>("identity-url") else {
        return Ok(()); // Should be handled by required=true in clap
    };

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(format!(
            "Invalid --identity-url '{url}': must be an http(s) URL"
        ));
    }
    Ok(())
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("enirejo")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("ENIREJO_PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = identity::with_args(command);
    logging::with_args(command)
}
