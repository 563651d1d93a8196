use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid address: {0}")]
    Address(String),

    #[error("send failed: {0}")]
    Send(String),
}

/// Delivery side effect. May fail independently of the price append that
/// triggered it; callers report the failure instead of rolling back.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// SMTP delivery via a STARTTLS relay.
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpNotifier {
    pub fn from_env() -> Result<Self, NotifyError> {
        let host = require_env("SMTP_HOST")?;
        let port = require_env("SMTP_PORT")?
            .parse::<u16>()
            .map_err(|e| NotifyError::Config(format!("invalid SMTP_PORT: {e}")))?;
        let username = require_env("SMTP_USERNAME")?;
        let password = require_env("SMTP_PASSWORD")?;
        let from_email = require_env("SMTP_FROM_EMAIL")?;
        let from_name =
            std::env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Price Watch".to_string());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
            .map_err(|e| NotifyError::Config(format!("failed to create SMTP transport: {e}")))?
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Self {
            mailer,
            from: format!("{from_name} <{from_email}>"),
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        let email = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| NotifyError::Address(format!("invalid from address: {e}")))?,
            )
            .to(recipient
                .parse()
                .map_err(|e| NotifyError::Address(format!("invalid to address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| NotifyError::Send(format!("failed to build email: {e}")))?;

        self.mailer
            .send(email)
            .await
            .map(|_| ())
            .map_err(|e| NotifyError::Send(e.to_string()))
    }
}

/// Fallback when SMTP is disabled: log what would have been sent.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        info!("📧 Notification (SMTP disabled):");
        info!("   To: {}", recipient);
        info!("   Subject: {}", subject);
        info!("   Body: {}", body);
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String, NotifyError> {
    std::env::var(key).map_err(|_| NotifyError::Config(format!("{key} not set")))
}
