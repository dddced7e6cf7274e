//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action to run, which today is always the
//! HTTP server with its full configuration.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_DB_PASSWORD, ARG_DSN, ARG_PORT, auth};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;
    let db_password = matches
        .get_one::<String>(ARG_DB_PASSWORD)
        .cloned()
        .map(SecretString::from);

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        db_password,
        session_secret: auth_opts.session_secret,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        public_url: auth_opts.public_url,
        default_locale: auth_opts.default_locale,
    }))
}
