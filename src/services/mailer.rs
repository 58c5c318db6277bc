//! Outgoing mail.
//!
//! Mail is fire-and-forget: [`dispatch`] spawns the send and only logs a failure, so
//! the write that triggered the mail has already been committed and is never undone.

use crate::{
    config::settings::MailConfig,
    errors::{Error, Result},
};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::sync::Arc;

/// One message to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

impl OutgoingMail {
    /// Invitation with a registration link.
    #[must_use]
    pub fn invite(to: &str, name: Option<&str>, registration_link: &str) -> Self {
        let greeting = name.map_or_else(|| "Hello".to_string(), |n| format!("Hello {n}"));
        Self {
            to: to.to_string(),
            subject: "You're invited to our class reunion".to_string(),
            body: format!(
                "{greeting},\n\nThe reunion committee has invited you to join the reunion site.\n\
                 Register here:\n\n{registration_link}\n\nSee you there!"
            ),
        }
    }

    /// Announcement copy for one member.
    #[must_use]
    pub fn announcement(to: &str, title: &str, body: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: format!("Reunion announcement: {title}"),
            body: body.to_string(),
        }
    }
}

/// Something that can deliver mail.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Delivers one message.
    async fn send(&self, mail: OutgoingMail) -> Result<()>;
}

/// Delivers mail through an SMTP relay with STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Builds a mailer for `host`, authenticating when credentials are configured.
    pub fn new(config: &MailConfig, host: &str) -> Result<Self> {
        let from = config.from.parse::<Mailbox>().map_err(|e| Error::Config {
            message: format!("Invalid mail.from address {}: {e}", config.from),
        })?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| Error::Config {
                message: format!("Invalid SMTP host {host}: {e}"),
            })?
            .port(config.smtp_port);
        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        let to = mail.to.parse::<Mailbox>().map_err(|e| Error::Mail {
            message: format!("Invalid recipient {}: {e}", mail.to),
        })?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(mail.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body)
            .map_err(|e| Error::Mail {
                message: e.to_string(),
            })?;

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| Error::Mail {
                message: e.to_string(),
            })
    }
}

/// Writes mail to the log instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        tracing::info!("Mail to {}: {}", mail.to, mail.subject);
        tracing::debug!("Mail body:\n{}", mail.body);
        Ok(())
    }
}

/// Picks the SMTP mailer when a host is configured, the log mailer otherwise.
pub fn from_config(config: &MailConfig) -> Result<Arc<dyn Mailer>> {
    match config.smtp_host.as_deref() {
        Some(host) => {
            tracing::info!("Sending mail through {}:{}", host, config.smtp_port);
            Ok(Arc::new(SmtpMailer::new(config, host)?))
        }
        None => {
            tracing::warn!("No SMTP host configured, mail will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

/// Sends `mail` in the background, logging a failure.
pub fn dispatch(mailer: &Arc<dyn Mailer>, mail: OutgoingMail) -> tokio::task::JoinHandle<()> {
    let mailer = Arc::clone(mailer);
    tokio::spawn(async move {
        let to = mail.to.clone();
        if let Err(e) = mailer.send(mail).await {
            tracing::warn!("Failed to send mail to {}: {}", to, e);
        }
    })
}
