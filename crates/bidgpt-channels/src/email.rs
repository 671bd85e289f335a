//! Email channel: feedback delivery over implicit-TLS SMTP (async lettre).
//!
//! Gmail-style app passwords on port 465 by default; any SMTPS relay works.

use async_trait::async_trait;
use bidgpt_core::config::{FeedbackConfig, MailCredentials};
use bidgpt_core::error::{BidGptError, Result};
use bidgpt_core::traits::Mailer;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message as LettreMessage, Tokio1Executor};
use std::time::Duration;

/// Fixed-format feedback mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackMessage {
    pub subject: String,
    pub body: String,
}

impl FeedbackMessage {
    pub fn new(rating: &str, feedback: &str) -> Self {
        Self {
            subject: format!("BidGPT Feedback - Rating: {rating}"),
            body: format!("Rating: {rating}\nFeedback: {feedback}"),
        }
    }
}

/// SMTP mailer bound to one sender account and one recipient.
pub struct SmtpMailer {
    host: String,
    port: u16,
    timeout: Duration,
    credentials: MailCredentials,
}

impl SmtpMailer {
    /// `None` when any of user / password / recipient is missing.
    pub fn from_config(config: &FeedbackConfig) -> Option<Self> {
        let credentials = config.credentials()?;
        Some(Self {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
            credentials,
        })
    }

    pub fn recipient(&self) -> &str {
        &self.credentials.recipient
    }

    /// Build the RFC 5322 message without sending it.
    pub fn build_message(&self, subject: &str, body: &str) -> Result<LettreMessage> {
        let from: Mailbox = self
            .credentials
            .username
            .parse()
            .map_err(|e| BidGptError::Mail(format!("Invalid from: {e}")))?;
        let to: Mailbox = self
            .credentials
            .recipient
            .parse()
            .map_err(|e| BidGptError::Mail(format!("Invalid to: {e}")))?;

        LettreMessage::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| BidGptError::Mail(format!("Build email: {e}")))
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let creds = Credentials::new(
            self.credentials.username.clone(),
            self.credentials.password.clone(),
        );
        Ok(AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
            .map_err(|e| BidGptError::Mail(format!("SMTP relay: {e}")))?
            .port(self.port)
            .credentials(creds)
            .timeout(Some(self.timeout))
            .build())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    fn name(&self) -> &str {
        "smtp"
    }

    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let email = self.build_message(subject, body)?;
        let mailer = self.transport()?;

        // lettre's timeout is per socket operation; bound the whole session too.
        match tokio::time::timeout(self.timeout * 3, mailer.send(email)).await {
            Ok(Ok(_)) => {
                tracing::info!("📤 Feedback email sent to: {}", self.credentials.recipient);
                Ok(())
            }
            Ok(Err(e)) => Err(BidGptError::Mail(format!("SMTP send: {e}"))),
            Err(_) => Err(BidGptError::Mail(format!(
                "SMTP send timed out after {}s",
                (self.timeout * 3).as_secs()
            ))),
        }
    }
}
