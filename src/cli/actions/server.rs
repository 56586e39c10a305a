use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};
use url::Url;

use crate::accounts::{
    AccountConfig, AccountRepository, InMemoryAccountRepository, PgAccountRepository,
};
use crate::api::{self, AppState};
use crate::cli::telemetry;
use crate::mail::{HttpMailSender, LogMailSender, MailSender};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<SecretString>,
    pub mail_relay_url: Option<Url>,
    pub mail_relay_api_key: Option<SecretString>,
    pub mail_from: String,
    pub resend_cooldown_seconds: u64,
    pub session_ttl_seconds: u64,
    pub session_cookie_secure: bool,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database or mail relay cannot be set up, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let repository = repository(args.dsn.as_ref()).await?;
    let mail_sender = mail_sender(
        args.mail_relay_url,
        args.mail_relay_api_key,
        args.mail_from,
    )?;

    let config = AccountConfig::new()
        .with_resend_cooldown_seconds(args.resend_cooldown_seconds)
        .with_session_ttl_seconds(args.session_ttl_seconds);
    let state = AppState::new(repository, mail_sender, config, args.session_cookie_secure);

    let result = api::new(args.port, state).await;
    telemetry::shutdown_tracer();
    result
}

async fn repository(dsn: Option<&SecretString>) -> Result<Arc<dyn AccountRepository>> {
    let Some(dsn) = dsn else {
        warn!("No DSN configured, accounts are kept in memory and lost on restart");
        return Ok(Arc::new(InMemoryAccountRepository::new()));
    };

    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(dsn.expose_secret())
        .await
        .context("Failed to connect to database")?;

    info!("Connected to database");
    Ok(Arc::new(PgAccountRepository::new(pool)))
}

fn mail_sender(
    relay_url: Option<Url>,
    api_key: Option<SecretString>,
    from: String,
) -> Result<Arc<dyn MailSender>> {
    match (relay_url, api_key) {
        (Some(url), Some(api_key)) => {
            info!(relay = %url, "Sending mail through HTTP relay");
            Ok(Arc::new(HttpMailSender::new(url, api_key, from)?))
        }
        (Some(_), None) => anyhow::bail!("--mail-relay-api-key is required with --mail-relay-url"),
        (None, _) => {
            warn!("No mail relay configured, confirmation emails are only logged");
            Ok(Arc::new(LogMailSender))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_without_key_is_rejected() -> Result<()> {
        let url = Url::parse("https://relay.admin.localhost/v3/smtp/email")?;
        let result = mail_sender(Some(url), None, "admin@admin.localhost".to_string());
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn relay_with_key_builds() -> Result<()> {
        let url = Url::parse("https://relay.admin.localhost/v3/smtp/email")?;
        let sender = mail_sender(
            Some(url),
            Some(SecretString::from("key")),
            "admin@admin.localhost".to_string(),
        );
        assert!(sender.is_ok());
        assert!(mail_sender(None, None, String::new()).is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn no_dsn_uses_memory() -> Result<()> {
        let repository = repository(None).await?;
        assert_eq!(repository.count().await?, 0);
        Ok(())
    }
}
