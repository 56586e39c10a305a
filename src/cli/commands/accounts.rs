use clap::{Arg, ArgAction, ArgMatches, Command};

pub const ARG_RESEND_COOLDOWN_SECONDS: &str = "resend-cooldown-seconds";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_SESSION_COOKIE_SECURE: &str = "session-cookie-secure";

#[derive(Debug)]
pub struct Options {
    pub resend_cooldown_seconds: u64,
    pub session_ttl_seconds: u64,
    pub session_cookie_secure: bool,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            resend_cooldown_seconds: matches
                .get_one::<u64>(ARG_RESEND_COOLDOWN_SECONDS)
                .copied()
                .unwrap_or(3600),
            session_ttl_seconds: matches
                .get_one::<u64>(ARG_SESSION_TTL_SECONDS)
                .copied()
                .unwrap_or(43200),
            session_cookie_secure: matches.get_flag(ARG_SESSION_COOKIE_SECURE),
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_RESEND_COOLDOWN_SECONDS)
                .long(ARG_RESEND_COOLDOWN_SECONDS)
                .help("Minimum seconds between confirmation emails for one account")
                .env("ADMIN_ACCOUNTS_RESEND_COOLDOWN_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Seconds a login session stays valid")
                .env("ADMIN_ACCOUNTS_SESSION_TTL_SECONDS")
                .default_value("43200")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_SESSION_COOKIE_SECURE)
                .long(ARG_SESSION_COOKIE_SECURE)
                .help("Mark the session cookie Secure (serve over HTTPS)")
                .env("ADMIN_ACCOUNTS_SESSION_COOKIE_SECURE")
                .action(ArgAction::SetTrue),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        temp_env::with_vars(
            [
                ("ADMIN_ACCOUNTS_RESEND_COOLDOWN_SECONDS", None::<&str>),
                ("ADMIN_ACCOUNTS_SESSION_TTL_SECONDS", None),
                ("ADMIN_ACCOUNTS_SESSION_COOKIE_SECURE", None),
            ],
            || {
                let matches = with_args(Command::new("test")).get_matches_from(["test"]);
                let options = Options::parse(&matches);
                assert_eq!(options.resend_cooldown_seconds, 3600);
                assert_eq!(options.session_ttl_seconds, 43200);
                assert!(!options.session_cookie_secure);
            },
        );
    }

    #[test]
    fn from_env() {
        temp_env::with_vars(
            [
                ("ADMIN_ACCOUNTS_RESEND_COOLDOWN_SECONDS", Some("60")),
                ("ADMIN_ACCOUNTS_SESSION_TTL_SECONDS", Some("900")),
                ("ADMIN_ACCOUNTS_SESSION_COOKIE_SECURE", Some("true")),
            ],
            || {
                let matches = with_args(Command::new("test")).get_matches_from(["test"]);
                let options = Options::parse(&matches);
                assert_eq!(options.resend_cooldown_seconds, 60);
                assert_eq!(options.session_ttl_seconds, 900);
                assert!(options.session_cookie_secure);
            },
        );
    }
}
