use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

/// Subject line of every alert
pub const ALERT_SUBJECT: &str = "Amazon Price Drop Alert";

/// Mail session errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NotifyError {
    #[error("Invalid mail address: {0}")]
    Address(String),
    #[error("Mail transport error: {0}")]
    Transport(String),
    #[error("Failed to compose message: {0}")]
    Compose(String),
    #[error("Failed to send message: {0}")]
    Send(String),
}

/// Delivers a price alert to the owner
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send exactly one alert for the observed price
    async fn notify(&self, price: Decimal, product_url: &str) -> Result<(), NotifyError>;
}

/// Plaintext body of the alert
pub fn alert_body(price: Decimal, product_url: &str) -> String {
    format!(
        "Price Alert! The product price dropped to £{}\nCheck it here: {}",
        price, product_url
    )
}

/// Sends alerts to the configured address over an authenticated STARTTLS session
pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    mailbox: Mailbox,
}

impl EmailNotifier {
    pub fn new(config: &Config) -> Result<Self, NotifyError> {
        let mailbox: Mailbox = config
            .email
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Address(e.to_string()))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(config.email.clone(), config.email_password.clone()))
            .build();

        Ok(Self { transport, mailbox })
    }

    /// Build the alert message; sender and recipient are both the owner
    pub fn compose(&self, price: Decimal, product_url: &str) -> Result<Message, NotifyError> {
        Message::builder()
            .from(self.mailbox.clone())
            .to(self.mailbox.clone())
            .subject(ALERT_SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(alert_body(price, product_url))
            .map_err(|e| NotifyError::Compose(e.to_string()))
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, price: Decimal, product_url: &str) -> Result<(), NotifyError> {
        let message = self.compose(price, product_url)?;

        debug!("Opening mail session for {}", self.mailbox);
        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Send(e.to_string()))?;

        Ok(())
    }
}
