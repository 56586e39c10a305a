use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::token::{EmailCheckToken, digest_token};

/// Surrogate account identifier, assigned when the account is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user record with credentials and verification status.
///
/// `password` holds an Argon2id PHC string and `email_check_token` the
/// SHA-256 digest of the last issued token; raw values never reach storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub nickname: String,
    pub password: String,
    pub email_verified: bool,
    pub email_check_token: Option<Vec<u8>>,
    pub email_check_token_generated_at: Option<DateTime<Utc>>,
    pub joined_at: Option<DateTime<Utc>>,
}

impl Account {
    #[must_use]
    pub fn new(email: String, nickname: String, password_hash: String) -> Self {
        Self {
            id: AccountId::new(),
            email,
            nickname,
            password: password_hash,
            email_verified: false,
            email_check_token: None,
            email_check_token_generated_at: None,
            joined_at: None,
        }
    }

    /// Return the account carrying `token` as its only valid email proof.
    ///
    /// Any previously issued token stops matching.
    #[must_use]
    pub fn with_email_check_token(self, token: &EmailCheckToken, issued_at: DateTime<Utc>) -> Self {
        Self {
            email_check_token: Some(token.digest()),
            email_check_token_generated_at: Some(issued_at),
            ..self
        }
    }

    #[must_use]
    pub fn is_valid_token(&self, token: &str) -> bool {
        self.email_check_token
            .as_deref()
            .is_some_and(|stored| stored == digest_token(token).as_slice())
    }

    /// Mark the email as verified and consume the email check token.
    ///
    /// `joined_at` is only set the first time; a token reissued afterwards is
    /// consumed without moving it.
    #[must_use]
    pub fn complete_sign_up(self, now: DateTime<Utc>) -> Self {
        Self {
            email_verified: true,
            joined_at: self.joined_at.or(Some(now)),
            email_check_token: None,
            email_check_token_generated_at: None,
            ..self
        }
    }

    /// Whether enough time passed since the last token to mail a new one.
    #[must_use]
    pub fn can_send_confirm_email(&self, now: DateTime<Utc>, cooldown: Duration) -> bool {
        self.email_check_token_generated_at.is_none_or(|issued_at| {
            issued_at
                .checked_add_signed(cooldown)
                .is_some_and(|ready_at| ready_at <= now)
        })
    }
}
