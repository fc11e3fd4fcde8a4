//! Outbound email.
//!
//! [`Mailer`] is the seam used by the reset flow. Delivery failures are
//! reported to the caller; nothing here retries.

pub mod smtp;
pub mod templates;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

pub use smtp::{SmtpMailer, SmtpSettings};

/// Mail delivery errors.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid address: {0}")]
    Address(String),

    #[error("Message build failed: {0}")]
    Build(String),

    #[error("Transport failed: {0}")]
    Transport(String),
}

/// Sends a single HTML email.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        to_address: &str,
        to_name: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), MailError>;
}

/// Development mailer: logs the envelope instead of delivering it.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(
        &self,
        to_address: &str,
        to_name: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), MailError> {
        info!(
            to = to_address,
            name = to_name,
            subject,
            bytes = html_body.len(),
            "mail not delivered (log mailer)"
        );
        Ok(())
    }
}
