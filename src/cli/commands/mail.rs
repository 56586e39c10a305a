use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use url::Url;

pub const ARG_MAIL_RELAY_URL: &str = "mail-relay-url";
pub const ARG_MAIL_RELAY_API_KEY: &str = "mail-relay-api-key";
pub const ARG_MAIL_FROM: &str = "mail-from";

#[derive(Debug)]
pub struct Options {
    pub relay_url: Option<Url>,
    pub relay_api_key: Option<SecretString>,
    pub from: String,
}

impl Options {
    /// Parse mail arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the relay URL is not a valid URL.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        // Env vars set to "" count as unset.
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };

        let relay_url = get_non_empty(ARG_MAIL_RELAY_URL)
            .map(|url| {
                Url::parse(&url)
                    .map_err(|err| anyhow::anyhow!("invalid --{ARG_MAIL_RELAY_URL} {url}: {err}"))
            })
            .transpose()?;

        Ok(Self {
            relay_url,
            relay_api_key: get_non_empty(ARG_MAIL_RELAY_API_KEY).map(SecretString::from),
            from: get_non_empty(ARG_MAIL_FROM).unwrap_or_default(),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_MAIL_RELAY_URL)
                .long(ARG_MAIL_RELAY_URL)
                .help("HTTP mail relay endpoint; confirmation emails are only logged when unset")
                .env("ADMIN_ACCOUNTS_MAIL_RELAY_URL"),
        )
        .arg(
            Arg::new(ARG_MAIL_RELAY_API_KEY)
                .long(ARG_MAIL_RELAY_API_KEY)
                .help("API key sent to the mail relay")
                .env("ADMIN_ACCOUNTS_MAIL_RELAY_API_KEY")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_MAIL_FROM)
                .long(ARG_MAIL_FROM)
                .help("Sender address for outgoing mail")
                .env("ADMIN_ACCOUNTS_MAIL_FROM")
                .default_value("admin@admin.localhost"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn parse(args: &[&str]) -> anyhow::Result<Options> {
        let matches = with_args(Command::new("test")).get_matches_from(args);
        Options::parse(&matches)
    }

    #[test]
    fn defaults_to_no_relay() -> anyhow::Result<()> {
        temp_env::with_vars(
            [
                ("ADMIN_ACCOUNTS_MAIL_RELAY_URL", None::<&str>),
                ("ADMIN_ACCOUNTS_MAIL_RELAY_API_KEY", None),
                ("ADMIN_ACCOUNTS_MAIL_FROM", None),
            ],
            || {
                let options = parse(&["test"])?;
                assert!(options.relay_url.is_none());
                assert!(options.relay_api_key.is_none());
                assert_eq!(options.from, "admin@admin.localhost");
                Ok(())
            },
        )
    }

    #[test]
    fn relay_from_env() -> anyhow::Result<()> {
        temp_env::with_vars(
            [
                (
                    "ADMIN_ACCOUNTS_MAIL_RELAY_URL",
                    Some("https://relay.admin.localhost/v3/smtp/email"),
                ),
                ("ADMIN_ACCOUNTS_MAIL_RELAY_API_KEY", Some("relay-key")),
            ],
            || {
                let options = parse(&["test"])?;
                assert_eq!(
                    options.relay_url.map(String::from).as_deref(),
                    Some("https://relay.admin.localhost/v3/smtp/email")
                );
                assert_eq!(
                    options
                        .relay_api_key
                        .as_ref()
                        .map(|key| key.expose_secret().to_string())
                        .as_deref(),
                    Some("relay-key")
                );
                Ok(())
            },
        )
    }

    #[test]
    fn empty_env_is_unset() -> anyhow::Result<()> {
        temp_env::with_var("ADMIN_ACCOUNTS_MAIL_RELAY_URL", Some(""), || {
            let options = parse(&["test"])?;
            assert!(options.relay_url.is_none());
            Ok(())
        })
    }

    #[test]
    fn invalid_relay_url_is_an_error() {
        temp_env::with_var("ADMIN_ACCOUNTS_MAIL_RELAY_URL", None::<&str>, || {
            let result = parse(&["test", "--mail-relay-url", "not a url"]);
            assert!(result.is_err());
        });
    }
}
