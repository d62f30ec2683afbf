use anyhow::Context;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info};

use highfive_common::EmailConfig;

use super::backend::NotifyBackend;
use super::HighFiveDigest;

/// Plain-text e-mail over SMTP with STARTTLS.
pub struct EmailBackend {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    recipients: Vec<Mailbox>,
}

impl EmailBackend {
    pub fn from_config(config: &EmailConfig) -> anyhow::Result<Self> {
        let (from, recipients) = parse_addresses(config)?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .with_context(|| format!("Invalid SMTP host {}", config.smtp_host))?
            .port(config.smtp_port);
        if let (Some(user), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        info!(
            host = %config.smtp_host,
            port = config.smtp_port,
            recipients = recipients.len(),
            "Email notifications initialized (SMTP with STARTTLS)"
        );

        Ok(Self {
            mailer: builder.build(),
            from,
            recipients,
        })
    }

    fn message(&self, digest: &HighFiveDigest) -> anyhow::Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(digest.subject.as_str());
        for to in &self.recipients {
            builder = builder.to(to.clone());
        }
        builder
            .header(ContentType::TEXT_PLAIN)
            .body(digest.body.clone())
            .context("Failed to build notification email")
    }
}

/// Sender plus the primary and optional secondary recipient.
fn parse_addresses(config: &EmailConfig) -> anyhow::Result<(Mailbox, Vec<Mailbox>)> {
    let from: Mailbox = config
        .from
        .parse()
        .with_context(|| format!("Invalid from-email address {}", config.from))?;

    let mut recipients: Vec<Mailbox> = vec![config
        .to
        .parse()
        .with_context(|| format!("Invalid to-email address {}", config.to))?];
    if let Some(secondary) = &config.to_secondary {
        recipients.push(
            secondary
                .parse()
                .with_context(|| format!("Invalid to-email-secondary address {secondary}"))?,
        );
    }

    Ok((from, recipients))
}

#[async_trait]
impl NotifyBackend for EmailBackend {
    async fn send(&self, digest: &HighFiveDigest) -> anyhow::Result<()> {
        let message = self.message(digest)?;

        if let Err(e) = self.mailer.send(message).await {
            error!(
                error = %e,
                subject = %digest.subject,
                recipients = self.recipients.len(),
                "Failed to send notification email"
            );
            return Err(anyhow::Error::new(e).context("Failed to send notification email"));
        }

        info!(
            count = digest.count,
            recipients = self.recipients.len(),
            "Notification email sent"
        );
        Ok(())
    }
}
