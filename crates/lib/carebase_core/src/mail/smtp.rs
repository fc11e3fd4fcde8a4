//! SMTP delivery via lettre.

use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{MailError, Mailer};

/// Connection settings for an SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender, e.g. `Carebase Hospital <noreply@carebase.local>`.
    pub from: String,
}

/// Mailer delivering through a STARTTLS SMTP relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: SmtpSettings) -> Result<Self, MailError> {
        let from: Mailbox = settings
            .from
            .parse()
            .map_err(|e| MailError::Address(format!("{}: {e}", settings.from)))?;
        let creds = Credentials::new(settings.username, settings.password);
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(settings.port)
            .credentials(creds)
            .build();
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(
        &self,
        to_address: &str,
        to_name: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), MailError> {
        let to = Mailbox::new(
            Some(to_name.to_string()),
            to_address
                .parse()
                .map_err(|e| MailError::Address(format!("{to_address}: {e}")))?,
        );
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| MailError::Build(e.to_string()))?;
        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(from: &str) -> SmtpSettings {
        SmtpSettings {
            host: "smtp.example.com".into(),
            port: 587,
            username: "user".into(),
            password: "pass".into(),
            from: from.into(),
        }
    }

    #[tokio::test]
    async fn rejects_invalid_sender() {
        assert!(matches!(
            SmtpMailer::new(settings("not an address")),
            Err(MailError::Address(_))
        ));
    }

    #[tokio::test]
    async fn builds_with_named_sender() {
        assert!(SmtpMailer::new(settings("Carebase <noreply@carebase.local>")).is_ok());
    }
}
