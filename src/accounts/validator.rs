use std::sync::Arc;
use tracing::{debug, instrument};

use super::form::{FIELD_EMAIL, FIELD_NICKNAME, FieldErrors, SignUpForm};
use super::{AccountError, AccountRepository};

pub const CODE_INVALID_EMAIL: &str = "invalid.email";
pub const CODE_INVALID_NICKNAME: &str = "invalid.nickname";

/// Checks a bound sign-up form for email/nickname uniqueness.
///
/// Read-only against the repository. Both checks run independently, so a form
/// can come back with two errors.
///
/// A taken nickname is reported under the `email` field key with the
/// `invalid.nickname` code; clients keying on the field name see it next to
/// the email input.
#[derive(Clone)]
pub struct SignUpFormValidator {
    repository: Arc<dyn AccountRepository>,
}

impl SignUpFormValidator {
    #[must_use]
    pub fn new(repository: Arc<dyn AccountRepository>) -> Self {
        Self { repository }
    }

    /// # Errors
    /// Returns [`AccountError::Storage`] if an existence lookup fails.
    #[instrument(skip(self, form), fields(email = %form.email, nickname = %form.nickname))]
    pub async fn validate(&self, form: &SignUpForm) -> Result<FieldErrors, AccountError> {
        let mut errors = FieldErrors::new();

        if self.repository.exists_by_email(&form.email).await? {
            debug!("email already registered");
            reject_duplicate(&mut errors, FIELD_EMAIL);
        }

        if self.repository.exists_by_nickname(&form.nickname).await? {
            debug!("nickname already registered");
            reject_duplicate(&mut errors, FIELD_NICKNAME);
        }

        Ok(errors)
    }
}

/// File a taken `field` the same way [`SignUpFormValidator::validate`] does.
///
/// Also used when storage reports the duplicate after validation passed.
pub fn reject_duplicate(errors: &mut FieldErrors, field: &str) {
    if field == FIELD_NICKNAME {
        errors.reject(FIELD_EMAIL, CODE_INVALID_NICKNAME, "nickname already in use");
    } else {
        errors.reject(FIELD_EMAIL, CODE_INVALID_EMAIL, "email already in use");
    }
}
