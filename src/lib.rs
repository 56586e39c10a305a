//! # admin-accounts
//!
//! Account sign-up and email verification for an administrative web app.
//!
//! A submitted sign-up form is format-checked, validated for email and
//! nickname uniqueness, then turned into an account whose password is stored
//! as an Argon2id hash. A one-time email check token is issued with the
//! account and mailed as a `/check-email-token` link; presenting it flips the
//! account to verified and opens a session.
//!
//! Storage is PostgreSQL (`sql/schema.sql`) or an in-process map when no DSN
//! is configured. Mail goes through an HTTP relay or is only logged.

pub mod accounts;
pub mod api;
pub mod cli;
pub mod mail;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
