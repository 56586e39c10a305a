//! HTTP mail relay sender (transactional mail API with an `api-key` header).

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{Instrument, debug, info_span};
use url::Url;

use super::{MailMessage, MailSender};

#[derive(Debug, Serialize)]
struct RelayAddress<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayRequest<'a> {
    sender: RelayAddress<'a>,
    to: Vec<RelayAddress<'a>>,
    subject: &'a str,
    text_content: &'a str,
}

#[derive(Debug)]
pub struct HttpMailSender {
    client: Client,
    url: Url,
    api_key: SecretString,
    from: String,
}

impl HttpMailSender {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: Url, api_key: SecretString, from: String) -> Result<Self> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .build()
            .context("failed to build mail relay client")?;
        Ok(Self {
            client,
            url,
            api_key,
            from,
        })
    }
}

#[async_trait]
impl MailSender for HttpMailSender {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        let body = RelayRequest {
            sender: RelayAddress { email: &self.from },
            to: vec![RelayAddress {
                email: &message.to,
            }],
            subject: &message.subject,
            text_content: &message.text,
        };

        let span = info_span!("mail.send", mail.relay = %self.url, mail.to = %message.to);
        let response = self
            .client
            .post(self.url.clone())
            .header("api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .instrument(span)
            .await
            .context("failed to reach mail relay")?;

        let status = response.status();
        if status.is_success() {
            debug!(to = %message.to, "mail accepted by relay");
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        Err(anyhow!("mail relay rejected message (status={status}): {detail}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn message() -> MailMessage {
        MailMessage {
            to: "test@email.com".to_string(),
            subject: "subject".to_string(),
            text: "/check-email-token?token=abc&email=test%40email.com".to_string(),
        }
    }

    async fn sender(server: &MockServer) -> Result<HttpMailSender> {
        let url = Url::parse(&format!("{}/v3/smtp/email", server.uri()))?;
        HttpMailSender::new(
            url,
            SecretString::from("relay-key"),
            "admin@admin.localhost".to_string(),
        )
    }

    #[tokio::test]
    async fn posts_message_with_api_key() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/smtp/email"))
            .and(header("api-key", "relay-key"))
            .and(body_json(json!({
                "sender": {"email": "admin@admin.localhost"},
                "to": [{"email": "test@email.com"}],
                "subject": "subject",
                "textContent": "/check-email-token?token=abc&email=test%40email.com"
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        sender(&server).await?.send(&message()).await
    }

    #[tokio::test]
    async fn relay_error_is_returned() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("relay down"))
            .mount(&server)
            .await;

        let result = sender(&server).await?.send(&message()).await;
        let err = result.err().map(|err| err.to_string()).unwrap_or_default();
        assert!(err.contains("status=500"), "unexpected error: {err}");
        assert!(err.contains("relay down"));
        Ok(())
    }
}
