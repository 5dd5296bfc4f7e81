use thiserror::Error;

use super::{dto::ReminderRequest, repo_types::ReminderDraft};
use crate::{auth::is_valid_email, timestamp};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("Title is required")]
    EmptyTitle,
    #[error("Scheduled time must look like YYYY-MM-DD HH:MM:SS")]
    BadTime,
    #[error("Invalid recipient email")]
    BadRecipient,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim and check owner input. Blank optional fields become `None`.
pub fn validate(req: ReminderRequest) -> Result<ReminderDraft, DraftError> {
    let title = req.title.trim().to_string();
    if title.is_empty() {
        return Err(DraftError::EmptyTitle);
    }
    let scheduled_time =
        timestamp::parse_user_input(&req.scheduled_time).ok_or(DraftError::BadTime)?;
    let recipient_override = non_blank(req.recipient_email).map(|r| r.to_lowercase());
    if let Some(r) = &recipient_override {
        if !is_valid_email(r) {
            return Err(DraftError::BadRecipient);
        }
    }
    Ok(ReminderDraft {
        title,
        description: non_blank(req.description),
        scheduled_time,
        recipient_override,
    })
}
