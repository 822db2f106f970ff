//! Mail alerts over SMTP.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;
use std::time::Duration;
use tracing::info;

use stock_judge::{Notifier, NotifyError, NotifyResult};

use crate::config::SmtpConfig;

const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends the alert as a plain-text mail to every `MAIL_TO` recipient.
#[derive(Debug)]
pub struct SmtpNotifier {
    config: SmtpConfig,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    pub(crate) fn build_message(&self, subject: &str, body: &str) -> NotifyResult<Message> {
        let from: Mailbox = self
            .config
            .from
            .parse()
            .map_err(|e| NotifyError::Message(format!("MAIL_FROM is invalid: {e}")))?;

        let mut builder = Message::builder().from(from).subject(subject);
        for to in &self.config.to {
            let mailbox: Mailbox = to
                .parse()
                .map_err(|e| NotifyError::Message(format!("MAIL_TO {to:?} is invalid: {e}")))?;
            builder = builder.to(mailbox);
        }

        builder
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| NotifyError::Message(e.to_string()))
    }

    fn transport(&self) -> NotifyResult<SmtpTransport> {
        let host = &self.config.host;
        let builder = if self.config.implicit_tls() {
            SmtpTransport::relay(host)
        } else {
            SmtpTransport::starttls_relay(host)
        }
        .map_err(|e| NotifyError::Transport(Box::new(e)))?;

        Ok(builder
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.expose_secret().to_string(),
            ))
            .timeout(Some(SEND_TIMEOUT))
            .build())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, subject: &str, body: &str) -> NotifyResult<()> {
        let message = self.build_message(subject, body)?;
        let transport = self.transport()?;

        // lettre's SmtpTransport is blocking
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| NotifyError::Transport(Box::new(e)))?
            .map_err(|e| NotifyError::Transport(Box::new(e)))?;

        info!(
            host = %self.config.host,
            recipients = self.config.to.len(),
            "Mail sent"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "smtp"
    }
}
