//! Map parsed CLI arguments to the action the binary runs.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_DSN, ARG_PORT, accounts, mail};
use anyhow::Result;
use secrecy::SecretString;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if an argument is present but malformed.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .filter(|dsn| !dsn.trim().is_empty())
        .map(|dsn| SecretString::from(dsn.as_str()));

    let mail_opts = mail::Options::parse(matches)?;
    let accounts_opts = accounts::Options::parse(matches);

    Ok(Action::Server(Args {
        port,
        dsn,
        mail_relay_url: mail_opts.relay_url,
        mail_relay_api_key: mail_opts.relay_api_key,
        mail_from: mail_opts.from,
        resend_cooldown_seconds: accounts_opts.resend_cooldown_seconds,
        session_ttl_seconds: accounts_opts.session_ttl_seconds,
        session_cookie_secure: accounts_opts.session_cookie_secure,
    }))
}
