//! One-way password hashing (Argon2id, PHC string format).

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
#[cfg(test)]
use argon2::{PasswordHash, PasswordVerifier};
use rand::rngs::OsRng;
use secrecy::{ExposeSecret, SecretString};

use super::AccountError;

/// Hash a raw password with a fresh random salt.
///
/// # Errors
/// Returns [`AccountError::Hash`] if Argon2 rejects the input.
pub fn hash_password(raw: &SecretString) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(raw.expose_secret().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AccountError::Hash)
}

/// Check a raw password against a stored PHC hash.
///
/// Malformed hashes never match.
#[cfg(test)]
#[must_use]
pub(crate) fn verify_password(raw: &SecretString, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(raw.expose_secret().as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_never_equals_raw() -> Result<(), AccountError> {
        let raw = SecretString::from("correct-password");
        let hash = hash_password(&raw)?;
        assert_ne!(hash, "correct-password");
        assert!(hash.starts_with("$argon2id$"));
        Ok(())
    }

    #[test]
    fn verify_accepts_only_the_original() -> Result<(), AccountError> {
        let hash = hash_password(&SecretString::from("correct-password"))?;
        assert!(verify_password(&SecretString::from("correct-password"), &hash));
        assert!(!verify_password(&SecretString::from("wrong-password"), &hash));
        Ok(())
    }

    #[test]
    fn salts_differ_between_hashes() -> Result<(), AccountError> {
        let raw = SecretString::from("correct-password");
        assert_ne!(hash_password(&raw)?, hash_password(&raw)?);
        Ok(())
    }

    #[test]
    fn malformed_hash_never_matches() {
        assert!(!verify_password(
            &SecretString::from("correct-password"),
            "correct-password"
        ));
    }
}
