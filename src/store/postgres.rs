use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::RecordStore;
use crate::{
    auth::repo_types::User,
    reminders::{repo, repo_types::Reminder},
};

#[derive(Clone)]
pub struct PgRecordStore {
    db: PgPool,
}

impl PgRecordStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn list_all_reminders(&self) -> anyhow::Result<Vec<Reminder>> {
        repo::list_all(&self.db).await
    }

    async fn get_user(&self, user_id: Uuid) -> anyhow::Result<Option<User>> {
        User::find_by_id(&self.db, user_id).await
    }

    async fn set_reminder_completed(
        &self,
        reminder_id: Uuid,
        scheduled_time: &str,
    ) -> anyhow::Result<bool> {
        repo::mark_completed(&self.db, reminder_id, scheduled_time).await
    }
}
