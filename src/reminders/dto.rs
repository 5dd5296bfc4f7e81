use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::Reminder;

/// Body of create and update requests.
#[derive(Debug, Deserialize)]
pub struct ReminderRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub scheduled_time: String,
    #[serde(default)]
    pub recipient_email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReminderResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_time: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub completed: bool,
    pub recipient_email: Option<String>,
}

impl From<Reminder> for ReminderResponse {
    fn from(r: Reminder) -> Self {
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            scheduled_time: r.scheduled_time,
            created_at: r.created_at,
            completed: r.completed,
            recipient_email: r.recipient_override,
        }
    }
}
