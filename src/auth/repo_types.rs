use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,                   // unique user ID
    pub username: String,           // display name
    pub email: String,              // login identity and mail sender
    #[serde(skip_serializing)]
    pub password_hash: String,      // Argon2 hash, not exposed in JSON
    #[serde(skip_serializing)]
    pub mail_credential: String,    // SMTP app password, empty until configured
    pub created_at: OffsetDateTime, // creation timestamp
}

impl User {
    /// Both a sender address and an SMTP secret are present.
    pub fn has_mail_credentials(&self) -> bool {
        !self.email.trim().is_empty() && !self.mail_credential.trim().is_empty()
    }
}
