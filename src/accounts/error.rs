use thiserror::Error;

/// Failures surfaced by the account service and its collaborators.
///
/// Field-level validation problems are not errors; they are reported as
/// [`FieldErrors`](super::FieldErrors) so the form can be redisplayed.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Storage rejected the write because the value is already taken.
    #[error("{0} already in use")]
    Duplicate(&'static str),
    #[error("invalid email check token")]
    InvalidToken,
    #[error("confirmation email was sent too recently")]
    ResendTooSoon,
    #[error("account not found")]
    NotFound,
    #[error("failed to hash password")]
    Hash,
    #[error("failed to generate token")]
    Token,
    #[error("storage failure: {0:#}")]
    Storage(anyhow::Error),
    #[error("mail transport failure: {0:#}")]
    Mail(anyhow::Error),
}

impl AccountError {
    /// Whether the caller can show this to the user instead of failing the request.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Duplicate(_) | Self::InvalidToken | Self::ResendTooSoon
        )
    }
}
