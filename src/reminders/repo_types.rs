use sqlx::FromRow;
use time::{OffsetDateTime, PrimitiveDateTime};
use uuid::Uuid;

use crate::{auth::repo_types::User, timestamp};

#[derive(Debug, Clone, FromRow)]
pub struct Reminder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS`, kept as text exactly as persisted.
    pub scheduled_time: String,
    pub created_at: OffsetDateTime,
    pub completed: bool,
    pub recipient_override: Option<String>,
}

impl Reminder {
    pub fn scheduled_at(&self) -> Result<PrimitiveDateTime, time::error::Parse> {
        timestamp::parse_stored(&self.scheduled_time)
    }

    /// The override when it is non-blank, otherwise the owner's address.
    pub fn recipient<'a>(&'a self, owner: &'a User) -> &'a str {
        match self.recipient_override.as_deref().map(str::trim) {
            Some(addr) if !addr.is_empty() => addr,
            _ => owner.email.as_str(),
        }
    }
}

/// Validated owner input for creating or editing a reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderDraft {
    pub title: String,
    pub description: Option<String>,
    pub scheduled_time: PrimitiveDateTime,
    pub recipient_override: Option<String>,
}
