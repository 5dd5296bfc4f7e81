use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::RecordStore;
use crate::{auth::repo_types::User, reminders::repo_types::Reminder};

/// In-process store for tests. Reminders keep insertion order.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<Uuid, User>>,
    reminders: Mutex<Vec<Reminder>>,
    fail_listing: AtomicBool,
    fail_user_lookup: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, email: &str, mail_credential: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            username: email.split('@').next().unwrap_or("user").to_string(),
            email: email.to_string(),
            password_hash: "unused".into(),
            mail_credential: mail_credential.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.users.lock().unwrap().insert(user.id, user.clone());
        user
    }

    pub fn set_mail_credential(&self, user_id: Uuid, secret: &str) {
        if let Some(u) = self.users.lock().unwrap().get_mut(&user_id) {
            u.mail_credential = secret.to_string();
        }
    }

    pub fn add_reminder(&self, user_id: Uuid, title: &str, scheduled_time: &str) -> Uuid {
        let reminder = Reminder {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            description: None,
            scheduled_time: scheduled_time.to_string(),
            created_at: OffsetDateTime::now_utc(),
            completed: false,
            recipient_override: None,
        };
        let id = reminder.id;
        self.reminders.lock().unwrap().push(reminder);
        id
    }

    pub fn edit_reminder(&self, id: Uuid, f: impl FnOnce(&mut Reminder)) {
        if let Some(r) = self.reminders.lock().unwrap().iter_mut().find(|r| r.id == id) {
            f(r);
        }
    }

    pub fn reminder(&self, id: Uuid) -> Option<Reminder> {
        self.reminders.lock().unwrap().iter().find(|r| r.id == id).cloned()
    }

    pub fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn fail_user_lookup(&self, fail: bool) {
        self.fail_user_lookup.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_all_reminders(&self) -> anyhow::Result<Vec<Reminder>> {
        if self.fail_listing.load(Ordering::SeqCst) {
            anyhow::bail!("store offline");
        }
        Ok(self.reminders.lock().unwrap().clone())
    }

    async fn get_user(&self, user_id: Uuid) -> anyhow::Result<Option<User>> {
        if self.fail_user_lookup.load(Ordering::SeqCst) {
            anyhow::bail!("user table locked");
        }
        Ok(self.users.lock().unwrap().get(&user_id).cloned())
    }

    async fn set_reminder_completed(
        &self,
        reminder_id: Uuid,
        scheduled_time: &str,
    ) -> anyhow::Result<bool> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("write rejected");
        }
        let mut reminders = self.reminders.lock().unwrap();
        match reminders
            .iter_mut()
            .find(|r| r.id == reminder_id && r.scheduled_time == scheduled_time)
        {
            Some(r) => {
                r.completed = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
