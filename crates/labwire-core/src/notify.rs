// ── Notification delivery ──
//
// `Notifier` is the seam for outbound mail. `SmtpNotifier` sends plain
// text over SMTP with `lettre`; tests substitute a recording notifier.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::config::NotificationConfig;
use crate::error::CoreError;

/// A plain-text mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), CoreError>;
}

/// Unauthenticated SMTP relay delivery.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

fn mailbox(raw: &str) -> Result<Mailbox, CoreError> {
    raw.trim().parse().map_err(|e| CoreError::Config {
        message: format!("invalid mail address '{raw}': {e}"),
    })
}

impl SmtpNotifier {
    pub fn new(config: &NotificationConfig) -> Result<Self, CoreError> {
        if config.to.is_empty() {
            return Err(CoreError::Config {
                message: "no notification recipients configured".into(),
            });
        }
        let transport =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.smtp_server.as_str())
                .port(config.smtp_port)
                .build();
        Ok(Self {
            transport,
            from: mailbox(&config.from)?,
            to: config
                .to
                .iter()
                .map(|addr| mailbox(addr))
                .collect::<Result<_, _>>()?,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, email: &Email) -> Result<(), CoreError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN);
        for recipient in &self.to {
            builder = builder.to(recipient.clone());
        }
        let message = builder
            .body(email.body.clone())
            .map_err(|e| CoreError::Notification {
                message: e.to_string(),
            })?;

        self.transport
            .send(message)
            .await
            .map_err(|e| CoreError::Notification {
                message: e.to_string(),
            })?;
        debug!(recipients = self.to.len(), subject = %email.subject, "mail sent");
        Ok(())
    }
}
