//! Email check and session token helpers.
//!
//! Raw tokens are only ever handed to the user (mail link or cookie); storage
//! keeps the SHA-256 digest.

use base64::Engine;
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use std::fmt;

use super::AccountError;

const TOKEN_BYTES: usize = 32;

/// Freshly issued proof of email ownership.
#[derive(Clone, PartialEq, Eq)]
pub struct EmailCheckToken(String);

impl EmailCheckToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digest persisted on the account in place of the raw token.
    #[must_use]
    pub fn digest(&self) -> Vec<u8> {
        digest_token(&self.0)
    }
}

impl fmt::Debug for EmailCheckToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EmailCheckToken(***)")
    }
}

/// Create a new random email check token.
///
/// Pure: the caller stores the digest on the account and persists it.
///
/// # Errors
/// Returns [`AccountError::Token`] if the OS random source fails.
pub fn generate_email_check_token() -> Result<EmailCheckToken, AccountError> {
    random_url_safe().map(EmailCheckToken)
}

/// Create a new session token for the auth cookie.
///
/// # Errors
/// Returns [`AccountError::Token`] if the OS random source fails.
pub fn generate_session_token() -> Result<String, AccountError> {
    random_url_safe()
}

/// SHA-256 of a raw token, used for storage and lookups.
#[must_use]
pub fn digest_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

fn random_url_safe() -> Result<String, AccountError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|_| AccountError::Token)?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}
