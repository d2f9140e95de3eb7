use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
};
use tracing::{debug, info};

use crate::{clients::EmailSender, config::Config, models::template::EmailContent};

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let from: Mailbox = config
            .email_from
            .parse()
            .map_err(|e| anyhow!("Invalid EMAIL_FROM address: {}", e))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| anyhow!("Failed to configure SMTP relay: {}", e))?
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        info!(host = %config.smtp_host, "SMTP mailer initialized");

        Ok(Self { transport, from })
    }
}

pub fn build_message(from: &Mailbox, to: &str, content: &EmailContent) -> Result<Message, Error> {
    let to: Mailbox = to
        .parse()
        .map_err(|e| anyhow!("Invalid recipient address '{}': {}", to, e))?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(content.subject.clone())
        .multipart(MultiPart::alternative_plain_html(
            content.text.clone(),
            content.html.clone(),
        ))
        .map_err(|e| anyhow!("Failed to build email: {}", e))
}

#[async_trait]
impl EmailSender for SmtpMailer {
    async fn send(&self, to: &str, content: &EmailContent) -> Result<(), Error> {
        let message = build_message(&self.from, to, content)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| anyhow!("SMTP send failed: {}", e))?;

        debug!("Notification email handed to SMTP relay");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> EmailContent {
        EmailContent {
            subject: "Charsi Notification System".to_string(),
            text: "tyrael bid on Harlequin Crest".to_string(),
            html: "<p>tyrael bid on Harlequin Crest</p>".to_string(),
        }
    }

    #[test]
    fn builds_multipart_message_with_subject() {
        let from: Mailbox = "Charsi <noreply@charsi.gg>".parse().unwrap();
        let message = build_message(&from, "player@example.com", &content()).unwrap();

        let raw = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(raw.contains("Subject: Charsi Notification System"));
        assert!(raw.contains("player@example.com"));
        assert!(raw.contains("multipart/alternative"));
    }

    #[test]
    fn rejects_malformed_recipient() {
        let from: Mailbox = "noreply@charsi.gg".parse().unwrap();
        assert!(build_message(&from, "not an address", &content()).is_err());
    }
}
