//! Record store consumed by the dispatch cycle.
//!
//! The cycle only ever needs a full scan of reminders, an owner lookup and a
//! per-record completion flip, so that is all the trait exposes. Writes must
//! touch exactly one reminder row.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{auth::repo_types::User, reminders::repo_types::Reminder};

#[cfg(test)]
pub mod memory;
mod postgres;

pub use postgres::PgRecordStore;

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_all_reminders(&self) -> anyhow::Result<Vec<Reminder>>;
    async fn get_user(&self, user_id: Uuid) -> anyhow::Result<Option<User>>;
    /// Flags the reminder only while it is still scheduled for `scheduled_time`.
    /// Returns whether a row was flagged.
    async fn set_reminder_completed(
        &self,
        reminder_id: Uuid,
        scheduled_time: &str,
    ) -> anyhow::Result<bool>;
}
