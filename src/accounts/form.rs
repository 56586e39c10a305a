//! Sign-up form binding: the transient input and its field-format checks.

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

pub const FIELD_EMAIL: &str = "email";
pub const FIELD_NICKNAME: &str = "nickname";
pub const FIELD_PASSWORD: &str = "password";

pub const CODE_INVALID_FORMAT: &str = "invalid.format";
pub const CODE_INVALID_LENGTH: &str = "invalid.length";

const PASSWORD_MIN_CHARS: usize = 8;
const PASSWORD_MAX_CHARS: usize = 50;

/// User-submitted registration data. Discarded once mapped to an account.
#[derive(ToSchema, Deserialize, Debug, Default)]
#[serde(default)]
pub struct SignUpForm {
    pub email: String,
    pub nickname: String,
    #[serde(deserialize_with = "deserialize_secret")]
    #[schema(value_type = String, format = Password, default = "")]
    pub password: SecretString,
}

/// What gets echoed back when the form is redisplayed; never the password.
#[derive(ToSchema, Serialize, Debug, Default, PartialEq, Eq)]
pub struct SignUpFormView {
    pub email: String,
    pub nickname: String,
    pub password: String,
}

impl From<&SignUpForm> for SignUpFormView {
    fn from(form: &SignUpForm) -> Self {
        Self {
            email: form.email.clone(),
            nickname: form.nickname.clone(),
            password: String::new(),
        }
    }
}

/// A single rejected field, in the order it was reported.
#[derive(ToSchema, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    #[schema(value_type = String)]
    pub field: &'static str,
    #[schema(value_type = String)]
    pub code: &'static str,
    pub message: String,
}

#[derive(ToSchema, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject(&mut self, field: &'static str, code: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            code,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn has_field_error(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }

    #[must_use]
    pub fn has_code(&self, code: &str) -> bool {
        self.0.iter().any(|error| error.code == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl SignUpForm {
    #[must_use]
    pub fn new(email: &str, nickname: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            nickname: nickname.to_string(),
            password: SecretString::from(password.to_string()),
        }
    }

    /// Trim whitespace and lowercase the email so lookups and uniqueness agree.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            email: normalize_email(&self.email),
            nickname: self.nickname.trim().to_string(),
            password: self.password,
        }
    }

    /// Field-format checks applied when binding the request, before any
    /// repository lookup.
    #[must_use]
    pub fn check_format(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if !valid_email(&self.email) {
            errors.reject(FIELD_EMAIL, CODE_INVALID_FORMAT, "not a valid email address");
        }

        if !valid_nickname(&self.nickname) {
            errors.reject(
                FIELD_NICKNAME,
                CODE_INVALID_FORMAT,
                "nickname must be 3-20 characters of hangul, a-z, 0-9, _ or -",
            );
        }

        let password_chars = self.password.expose_secret().chars().count();
        if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&password_chars) {
            errors.reject(
                FIELD_PASSWORD,
                CODE_INVALID_LENGTH,
                format!("password must be {PASSWORD_MIN_CHARS}-{PASSWORD_MAX_CHARS} characters"),
            );
        }

        errors
    }
}

/// Normalize an email for lookup/uniqueness checks.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

fn valid_nickname(nickname: &str) -> bool {
    Regex::new(r"^[ㄱ-ㅎ가-힣a-z0-9_-]{3,20}$").is_ok_and(|regex| regex.is_match(nickname))
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}
