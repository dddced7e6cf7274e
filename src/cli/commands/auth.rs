use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgMatches, Command, builder::PossibleValuesParser};
use secrecy::SecretString;

use crate::api::handlers::auth::token::MAX_TTL_SECONDS;

pub const ARG_SESSION_SECRET: &str = "session-secret";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_PUBLIC_URL: &str = "public-url";
pub const ARG_DEFAULT_LOCALE: &str = "default-locale";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_SECRET)
                .long(ARG_SESSION_SECRET)
                .help("Secret used to sign session tokens (at least 32 bytes)")
                .env("FACTURO_SESSION_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session token lifetime in seconds")
                .env("FACTURO_SESSION_TTL_SECONDS")
                .default_value("2592000")
                .value_parser(clap::value_parser!(i64).range(60..=MAX_TTL_SECONDS)),
        )
        .arg(
            Arg::new(ARG_PUBLIC_URL)
                .long(ARG_PUBLIC_URL)
                .help("Public base URL, session cookies are marked Secure when it uses https")
                .env("FACTURO_PUBLIC_URL")
                .default_value("http://localhost:8080"),
        )
        .arg(
            Arg::new(ARG_DEFAULT_LOCALE)
                .long(ARG_DEFAULT_LOCALE)
                .help("Locale used when neither the path nor the request names one")
                .env("FACTURO_DEFAULT_LOCALE")
                .default_value("en")
                .value_parser(PossibleValuesParser::new(["en", "es"])),
        )
}

#[derive(Debug)]
pub struct Options {
    pub session_secret: SecretString,
    pub session_ttl_seconds: i64,
    pub public_url: String,
    pub default_locale: String,
}

impl Options {
    /// Extract auth options from validated matches.
    ///
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let session_secret = matches
            .get_one::<String>(ARG_SESSION_SECRET)
            .cloned()
            .map(SecretString::from)
            .ok_or_else(|| anyhow!("missing required argument: --{ARG_SESSION_SECRET}"))?;
        let session_ttl_seconds = matches
            .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
            .copied()
            .context("missing session ttl")?;
        let public_url = matches
            .get_one::<String>(ARG_PUBLIC_URL)
            .cloned()
            .context("missing public url")?;
        let default_locale = matches
            .get_one::<String>(ARG_DEFAULT_LOCALE)
            .cloned()
            .context("missing default locale")?;

        Ok(Self {
            session_secret,
            session_ttl_seconds,
            public_url,
            default_locale,
        })
    }
}
