//! Mail transports behind the [`Mailer`] seam.

use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use crate::application::mail::{MailError, MailMessage, Mailer};
use crate::config::MailSettings;

use super::error::InfraError;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Posts each message as JSON to a mail relay endpoint.
#[derive(Clone)]
pub struct WebhookMailer {
    client: Client,
    endpoint: String,
    from: String,
}

impl WebhookMailer {
    pub fn new(endpoint: impl Into<String>, from: impl Into<String>) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(concat!("chefer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| InfraError::MailTransport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            from: from.into(),
        })
    }
}

#[async_trait]
impl Mailer for WebhookMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let payload = WebhookPayload {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            body: &message.body,
        };

        let response = match self.client.post(&self.endpoint).json(&payload).send().await {
            Ok(response) => response,
            Err(err) => {
                counter!("chefer_mail_failed_total").increment(1);
                return Err(MailError::Transport(err.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            counter!("chefer_mail_failed_total").increment(1);
            let detail = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        counter!("chefer_mail_sent_total").increment(1);
        Ok(())
    }
}

/// Writes messages to the log instead of delivering them.
#[derive(Debug, Clone)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        info!(
            from = %self.from,
            to = %message.to,
            subject = %message.subject,
            body_len = message.body.len(),
            "mail not delivered: no transport endpoint configured"
        );
        counter!("chefer_mail_sent_total").increment(1);
        Ok(())
    }
}

/// Pick the transport from settings: a webhook when an endpoint is set,
/// the log otherwise.
pub fn build_mailer(settings: &MailSettings) -> Result<Arc<dyn Mailer>, InfraError> {
    match settings.endpoint.as_deref() {
        Some(endpoint) => Ok(Arc::new(WebhookMailer::new(
            endpoint,
            settings.from.clone(),
        )?)),
        None => Ok(Arc::new(LogMailer::new(settings.from.clone()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_accepts_everything() {
        let mailer = LogMailer::new("kitchen@chefer.test");
        let message = MailMessage {
            to: "guest@example.com".into(),
            subject: "Hello".into(),
            body: "Welcome".into(),
        };
        assert!(mailer.send(&message).await.is_ok());
    }

    #[tokio::test]
    async fn webhook_mailer_reports_unreachable_endpoint() {
        let mailer = WebhookMailer::new("http://127.0.0.1:9/mail", "kitchen@chefer.test")
            .expect("client builds");
        let message = MailMessage {
            to: "guest@example.com".into(),
            subject: "Hello".into(),
            body: "Welcome".into(),
        };
        let err = mailer.send(&message).await.expect_err("port 9 refuses");
        assert!(matches!(err, MailError::Transport(_)));
    }
}
