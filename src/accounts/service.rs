use chrono::{TimeDelta, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    Account, AccountError, AccountRepository, EmailCheckToken, SignUpForm,
    generate_email_check_token, hash_password,
};
use crate::mail::{MailMessage, MailSender};
use crate::session::{DEFAULT_SESSION_TTL_SECONDS, Principal, Session, SessionStore};

pub const CONFIRM_EMAIL_SUBJECT: &str = "어드민, 회원 가입 인증";

const DEFAULT_RESEND_COOLDOWN_SECONDS: i64 = 60 * 60;

#[derive(Clone, Copy, Debug)]
pub struct AccountConfig {
    resend_cooldown: TimeDelta,
    session_ttl: TimeDelta,
}

impl AccountConfig {
    /// Default config: a confirmation email can be re-sent once per hour and
    /// sessions last twelve hours.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resend_cooldown: TimeDelta::seconds(DEFAULT_RESEND_COOLDOWN_SECONDS),
            session_ttl: TimeDelta::seconds(DEFAULT_SESSION_TTL_SECONDS),
        }
    }

    #[must_use]
    pub fn with_resend_cooldown_seconds(mut self, seconds: u64) -> Self {
        self.resend_cooldown = seconds_to_delta(seconds);
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.session_ttl = seconds_to_delta(seconds);
        self
    }

    #[must_use]
    pub fn resend_cooldown(&self) -> TimeDelta {
        self.resend_cooldown
    }

    #[must_use]
    pub fn session_ttl(&self) -> TimeDelta {
        self.session_ttl
    }
}

fn seconds_to_delta(seconds: u64) -> TimeDelta {
    i64::try_from(seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a successful email check.
#[derive(Debug)]
pub struct Verified {
    pub nickname: String,
    pub number_of_user: u64,
    pub session: Session,
}

/// Orchestrates sign-up, email verification and login.
///
/// Collaborators are passed in explicitly; the service holds no state of its
/// own besides them.
#[derive(Clone)]
pub struct AccountService {
    repository: Arc<dyn AccountRepository>,
    mail_sender: Arc<dyn MailSender>,
    sessions: Arc<SessionStore>,
    config: AccountConfig,
}

impl AccountService {
    #[must_use]
    pub fn new(
        repository: Arc<dyn AccountRepository>,
        mail_sender: Arc<dyn MailSender>,
        sessions: Arc<SessionStore>,
        config: AccountConfig,
    ) -> Self {
        Self {
            repository,
            mail_sender,
            sessions,
            config,
        }
    }

    /// Hash the password, build the account and persist it.
    ///
    /// # Errors
    /// Returns [`AccountError::Duplicate`] if storage rejects the email or
    /// nickname, [`AccountError::Storage`] on any other persistence failure.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn save_new_account(&self, form: &SignUpForm) -> Result<Account, AccountError> {
        let account = new_account(form)?;
        self.repository.save(account).await
    }

    /// Mail the verification link for `token` to the account's address.
    ///
    /// # Errors
    /// Returns [`AccountError::Mail`] if the transport fails. Not retried.
    #[instrument(skip(self, account, token), fields(account_id = %account.id))]
    pub async fn send_signup_confirm_email(
        &self,
        account: &Account,
        token: &EmailCheckToken,
    ) -> Result<(), AccountError> {
        let message = MailMessage {
            to: account.email.clone(),
            subject: CONFIRM_EMAIL_SUBJECT.to_string(),
            text: confirm_link(token, &account.email),
        };
        self.mail_sender
            .send(&message)
            .await
            .map_err(AccountError::Mail)?;
        debug!("confirmation email sent");
        Ok(())
    }

    /// Create the account with its first email check token and mail it.
    ///
    /// The account and token are written in a single `save`, so nothing is
    /// persisted if hashing, token generation or the write fails. The mail
    /// goes out after the write; if it fails the account stays persisted.
    ///
    /// # Errors
    /// Propagates persistence and mail failures; see [`AccountError`].
    #[instrument(skip(self, form), fields(email = %form.email, nickname = %form.nickname))]
    pub async fn process_new_account(&self, form: &SignUpForm) -> Result<Account, AccountError> {
        let token = generate_email_check_token()?;
        let account = new_account(form)?.with_email_check_token(&token, Utc::now());
        let account = self.repository.save(account).await?;
        info!(account_id = %account.id, "account created");

        self.send_signup_confirm_email(&account, &token).await?;
        Ok(account)
    }

    /// Open a session for `account`.
    ///
    /// # Errors
    /// Returns [`AccountError::Token`] if no session token could be generated.
    pub async fn login(&self, account: &Account) -> Result<Session, AccountError> {
        let principal = Principal::user(account.id, account.nickname.clone());
        let session = self.sessions.open(principal).await?;
        debug!(account_id = %account.id, "session opened");
        Ok(session)
    }

    /// Verify `(email, token)` and log the account in.
    ///
    /// An unknown email and a wrong token are indistinguishable to the caller.
    ///
    /// # Errors
    /// Returns [`AccountError::InvalidToken`] when the pair does not match;
    /// storage failures propagate.
    #[instrument(skip(self, token))]
    pub async fn check_email_token(
        &self,
        email: &str,
        token: &str,
    ) -> Result<Verified, AccountError> {
        let Some(account) = self.repository.find_by_email(email).await? else {
            debug!("no account for email");
            return Err(AccountError::InvalidToken);
        };
        if !account.is_valid_token(token) {
            debug!(account_id = %account.id, "email check token mismatch");
            return Err(AccountError::InvalidToken);
        }

        let account = self
            .repository
            .save(account.complete_sign_up(Utc::now()))
            .await?;
        info!(account_id = %account.id, "email verified");

        let session = self.login(&account).await?;
        let number_of_user = self.repository.count().await?;
        Ok(Verified {
            nickname: account.nickname,
            number_of_user,
            session,
        })
    }

    /// Issue a new email check token for the principal's account and mail it,
    /// unless the previous one is younger than the configured cooldown.
    ///
    /// # Errors
    /// Returns [`AccountError::ResendTooSoon`] inside the cooldown and
    /// [`AccountError::NotFound`] if the account no longer exists.
    #[instrument(skip(self, principal), fields(account_id = %principal.account_id))]
    pub async fn resend_confirm_email(&self, principal: &Principal) -> Result<(), AccountError> {
        let Some(account) = self.repository.find_by_id(principal.account_id).await? else {
            return Err(AccountError::NotFound);
        };
        let now = Utc::now();
        if !account.can_send_confirm_email(now, self.config.resend_cooldown()) {
            debug!("confirmation email requested inside cooldown");
            return Err(AccountError::ResendTooSoon);
        }

        let token = generate_email_check_token()?;
        let account = self
            .repository
            .save(account.with_email_check_token(&token, now))
            .await?;
        self.send_signup_confirm_email(&account, &token).await
    }
}

fn new_account(form: &SignUpForm) -> Result<Account, AccountError> {
    let password = hash_password(&form.password)?;
    Ok(Account::new(
        form.email.clone(),
        form.nickname.clone(),
        password,
    ))
}

/// Relative verification link carried in the confirmation email.
fn confirm_link(token: &EmailCheckToken, email: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("token", token.as_str())
        .append_pair("email", email)
        .finish();
    format!("/check-email-token?{query}")
}
