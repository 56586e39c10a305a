//! Account sign-up and email verification.
//!
//! Flow Overview:
//! 1. The form is bound and format-checked ([`SignUpForm::check_format`]).
//! 2. [`SignUpFormValidator`] rejects emails and nicknames already taken.
//! 3. [`AccountService::process_new_account`] hashes the password, issues an
//!    email check token, persists the account in one write and mails the
//!    verification link.
//! 4. [`AccountService::check_email_token`] flips the account to verified and
//!    opens a session for it.

mod error;
mod form;
mod model;
mod password;
mod postgres;
mod repository;
mod service;
mod token;
mod validator;

pub use error::AccountError;
pub use form::{
    CODE_INVALID_FORMAT, CODE_INVALID_LENGTH, FIELD_EMAIL, FIELD_NICKNAME, FIELD_PASSWORD,
    FieldError, FieldErrors, SignUpForm, SignUpFormView, normalize_email,
};
pub use model::{Account, AccountId};
pub use password::hash_password;
pub use postgres::PgAccountRepository;
pub use repository::{AccountRepository, InMemoryAccountRepository};
pub use service::{AccountConfig, AccountService, CONFIRM_EMAIL_SUBJECT, Verified};
pub use token::{EmailCheckToken, digest_token, generate_email_check_token, generate_session_token};
pub use validator::{
    CODE_INVALID_EMAIL, CODE_INVALID_NICKNAME, SignUpFormValidator, reject_duplicate,
};
