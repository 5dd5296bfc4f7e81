use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, instrument};

use super::{Notifier, ReminderEmail, SendError};
use crate::config::SmtpConfig;

/// Sends through one fixed relay, authenticating as each reminder's owner.
#[derive(Debug, Clone)]
pub struct SmtpNotifier {
    host: String,
    port: u16,
    timeout: Duration,
}

impl SmtpNotifier {
    pub fn new(cfg: &SmtpConfig) -> Self {
        Self {
            host: cfg.host.clone(),
            port: cfg.port,
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }

    fn transport(
        &self,
        username: &str,
        secret: &str,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, SendError> {
        // App passwords are often pasted with the spaces Gmail displays them with.
        let secret: String = secret.chars().filter(|c| !c.is_whitespace()).collect();
        let creds = Credentials::new(username.trim().to_string(), secret);

        let builder = if self.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
        }
        .map_err(|e| SendError::Delivery(format!("smtp relay {}: {e}", self.host)))?;

        Ok(builder
            .port(self.port)
            .credentials(creds)
            .timeout(Some(self.timeout))
            .build())
    }
}

pub(super) fn build_message(email: &ReminderEmail<'_>) -> Result<Message, SendError> {
    let from: Mailbox = email
        .sender_email
        .trim()
        .parse()
        .map_err(|e| SendError::Delivery(format!("invalid sender address: {e}")))?;
    let to: Mailbox = email
        .recipient_email
        .trim()
        .parse()
        .map_err(|e| SendError::Delivery(format!("invalid recipient address: {e}")))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject())
        .header(ContentType::TEXT_PLAIN)
        .body(email.body())
        .map_err(|e| SendError::Delivery(format!("build message: {e}")))
}

#[async_trait]
impl Notifier for SmtpNotifier {
    #[instrument(skip_all, fields(host = %self.host, to = %email.recipient_email))]
    async fn send(&self, email: &ReminderEmail<'_>) -> Result<(), SendError> {
        email.check_credentials()?;
        let message = build_message(email)?;
        // Dropped at the end of this call, which closes the session either way.
        let mailer = self.transport(email.sender_email, email.sender_credential)?;

        match tokio::time::timeout(self.timeout, mailer.send(message)).await {
            Ok(Ok(response)) => {
                debug!(code = %response.code(), "relay accepted message");
                Ok(())
            }
            Ok(Err(e)) => Err(SendError::Delivery(e.to_string())),
            Err(_) => Err(SendError::Delivery(format!(
                "timed out after {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn email<'a>(sender: &'a str, recipient: &'a str, credential: &'a str) -> ReminderEmail<'a> {
        ReminderEmail {
            sender_email: sender,
            sender_credential: credential,
            recipient_email: recipient,
            title: "Dentist",
            description: None,
            scheduled_time: datetime!(2025-06-01 14:30:00),
        }
    }

    fn notifier() -> SmtpNotifier {
        local_notifier(587)
    }

    fn local_notifier(port: u16) -> SmtpNotifier {
        SmtpNotifier::new(&SmtpConfig {
            host: "127.0.0.1".into(),
            port,
            timeout_secs: 1,
        })
    }

    #[test]
    fn builds_plain_text_message_with_headers() {
        let msg = build_message(&email("a@x.com", "b@y.com", "secret")).expect("valid message");
        let raw = String::from_utf8(msg.formatted()).unwrap();
        assert!(raw.contains("From: a@x.com"));
        assert!(raw.contains("To: b@y.com"));
        assert!(raw.contains("Subject: Reminder: Dentist"));
        assert!(raw.contains("text/plain"));
    }

    #[test]
    fn invalid_recipient_is_a_delivery_error() {
        let err = build_message(&email("a@x.com", "not an address", "secret")).unwrap_err();
        assert!(matches!(err, SendError::Delivery(ref m) if m.contains("recipient")));
    }

    #[tokio::test]
    async fn send_refuses_without_credentials_before_connecting() {
        let err = notifier()
            .send(&email("a@x.com", "b@y.com", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::MissingCredentials));
    }

    #[tokio::test]
    async fn refused_connection_is_a_delivery_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = local_notifier(port)
            .send(&email("a@x.com", "b@y.com", "secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::Delivery(_)));
    }

    #[tokio::test]
    async fn silent_relay_times_out_as_delivery_error() {
        // Accepts the TCP connection but never sends a greeting.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let started = std::time::Instant::now();
        let err = local_notifier(port)
            .send(&email("a@x.com", "b@y.com", "secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::Delivery(_)));
        assert!(started.elapsed() < Duration::from_secs(10));
        drop(listener);
    }
}
