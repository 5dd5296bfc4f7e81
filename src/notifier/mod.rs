//! Outbound reminder mail.
//!
//! A [`Notifier`] sends exactly one message per call and never retries; the
//! dispatch cycle retries by picking the reminder up again on its next run.

use async_trait::async_trait;
use thiserror::Error;
use time::PrimitiveDateTime;

use crate::timestamp;

mod smtp;

pub use smtp::SmtpNotifier;

/// Substituted for an empty reminder description.
pub const NO_DESCRIPTION: &str = "No description provided";

#[derive(Debug, Error)]
pub enum SendError {
    #[error("sender email or mail credential is not configured")]
    MissingCredentials,
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Everything needed to compose and deliver one reminder.
#[derive(Debug, Clone, Copy)]
pub struct ReminderEmail<'a> {
    pub sender_email: &'a str,
    pub sender_credential: &'a str,
    pub recipient_email: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub scheduled_time: PrimitiveDateTime,
}

impl ReminderEmail<'_> {
    pub fn check_credentials(&self) -> Result<(), SendError> {
        if self.sender_email.trim().is_empty() || self.sender_credential.trim().is_empty() {
            return Err(SendError::MissingCredentials);
        }
        Ok(())
    }

    pub fn subject(&self) -> String {
        format!("Reminder: {}", self.title)
    }

    pub fn body(&self) -> String {
        let description = match self.description.map(str::trim) {
            Some(d) if !d.is_empty() => d,
            _ => NO_DESCRIPTION,
        };
        format!(
            "Hello!\n\n\
             This is a reminder for: {title}\n\n\
             Description: {description}\n\n\
             Scheduled Time: {when}\n\n\
             ---\n\
             This is an automated reminder from the Reminder App.\n",
            title = self.title,
            when = timestamp::format_display(self.scheduled_time),
        )
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, email: &ReminderEmail<'_>) -> Result<(), SendError>;
}

#[cfg(test)]
pub mod fake {
    use std::sync::Mutex;

    use super::*;

    /// What a [`RecordingNotifier`] saw for one call.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SentMail {
        pub sender: String,
        pub recipient: String,
        pub subject: String,
    }

    /// Records every call; fails while `failing` is set.
    #[derive(Default)]
    pub struct RecordingNotifier {
        calls: Mutex<Vec<SentMail>>,
        failing: Mutex<bool>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_failing(&self, failing: bool) {
            *self.failing.lock().unwrap() = failing;
        }

        pub fn calls(&self) -> Vec<SentMail> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, email: &ReminderEmail<'_>) -> Result<(), SendError> {
            email.check_credentials()?;
            self.calls.lock().unwrap().push(SentMail {
                sender: email.sender_email.to_string(),
                recipient: email.recipient_email.to_string(),
                subject: email.subject(),
            });
            if *self.failing.lock().unwrap() {
                return Err(SendError::Delivery("connection reset by relay".into()));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn email(description: Option<&'static str>) -> ReminderEmail<'static> {
        ReminderEmail {
            sender_email: "a@x.com",
            sender_credential: "secret",
            recipient_email: "b@y.com",
            title: "Pay rent",
            description,
            scheduled_time: datetime!(2025-01-01 09:00:00),
        }
    }

    #[test]
    fn subject_uses_title() {
        assert_eq!(email(None).subject(), "Reminder: Pay rent");
    }

    #[test]
    fn body_contains_title_description_and_minute_time() {
        let body = email(Some("Transfer to landlord")).body();
        assert!(body.contains("This is a reminder for: Pay rent"));
        assert!(body.contains("Description: Transfer to landlord"));
        assert!(body.contains("Scheduled Time: 2025-01-01 09:00\n"));
        assert!(!body.contains("09:00:00"));
    }

    #[test]
    fn body_substitutes_placeholder_for_empty_description() {
        for d in [None, Some(""), Some("   ")] {
            let body = email(d).body();
            assert!(body.contains(&format!("Description: {NO_DESCRIPTION}")));
        }
    }

    #[test]
    fn missing_sender_or_secret_is_rejected() {
        let mut e = email(None);
        assert!(e.check_credentials().is_ok());
        e.sender_credential = "";
        assert!(matches!(e.check_credentials(), Err(SendError::MissingCredentials)));
        e.sender_credential = "secret";
        e.sender_email = " ";
        assert!(matches!(e.check_credentials(), Err(SendError::MissingCredentials)));
    }
}
