//! Outbound mail.
//!
//! Messages are plain text and delivered inline with the request; there is no
//! queue and no retry. A failed send surfaces to the caller as an error.
//! `LogMailSender` is the default when no relay is configured.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

mod relay;

pub use relay::HttpMailSender;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Mail delivery abstraction used by the account service.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Deliver a message or return the transport error.
    async fn send(&self, message: &MailMessage) -> Result<()>;
}

/// Local dev sender that logs the message instead of delivering it.
#[derive(Clone, Debug)]
pub struct LogMailSender;

#[async_trait]
impl MailSender for LogMailSender {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            text = %message.text,
            "mail send stub"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_sender_always_succeeds() -> Result<()> {
        let message = MailMessage {
            to: "test@email.com".to_string(),
            subject: "subject".to_string(),
            text: "/check-email-token?token=t&email=test%40email.com".to_string(),
        };
        LogMailSender.send(&message).await
    }
}
