use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Reminder, ReminderDraft};
use crate::timestamp;

const REMINDER_COLUMNS: &str =
    "id, user_id, title, description, scheduled_time, created_at, completed, recipient_override";

/// Full scan used by the dispatch cycle.
pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Reminder>> {
    let rows = sqlx::query_as::<_, Reminder>(&format!(
        "SELECT {REMINDER_COLUMNS} FROM reminders"
    ))
    .fetch_all(db)
    .await
    .context("list all reminders")?;
    Ok(rows)
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Reminder>> {
    let rows = sqlx::query_as::<_, Reminder>(&format!(
        r#"
        SELECT {REMINDER_COLUMNS}
          FROM reminders
         WHERE user_id = $1
         ORDER BY scheduled_time ASC, created_at ASC
        "#
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list reminders by user")?;
    Ok(rows)
}

pub async fn get_for_user(
    db: &PgPool,
    user_id: Uuid,
    reminder_id: Uuid,
) -> anyhow::Result<Option<Reminder>> {
    let row = sqlx::query_as::<_, Reminder>(&format!(
        "SELECT {REMINDER_COLUMNS} FROM reminders WHERE id = $1 AND user_id = $2"
    ))
    .bind(reminder_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("get reminder")?;
    Ok(row)
}

pub async fn insert(db: &PgPool, user_id: Uuid, draft: &ReminderDraft) -> anyhow::Result<Reminder> {
    let row = sqlx::query_as::<_, Reminder>(&format!(
        r#"
        INSERT INTO reminders
            (id, user_id, title, description, scheduled_time, completed, recipient_override)
        VALUES ($1, $2, $3, $4, $5, FALSE, $6)
        RETURNING {REMINDER_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&draft.title)
    .bind(&draft.description)
    .bind(timestamp::format_stored(draft.scheduled_time))
    .bind(&draft.recipient_override)
    .fetch_one(db)
    .await
    .context("insert reminder")?;
    Ok(row)
}

/// Patch the owner-editable fields of one pending reminder.
/// `None` means no pending reminder with that id belongs to the user.
pub async fn update_pending(
    db: &PgPool,
    user_id: Uuid,
    reminder_id: Uuid,
    draft: &ReminderDraft,
) -> anyhow::Result<Option<Reminder>> {
    let row = sqlx::query_as::<_, Reminder>(&format!(
        r#"
        UPDATE reminders
           SET title = $3, description = $4, scheduled_time = $5, recipient_override = $6
         WHERE id = $1 AND user_id = $2 AND completed = FALSE
        RETURNING {REMINDER_COLUMNS}
        "#
    ))
    .bind(reminder_id)
    .bind(user_id)
    .bind(&draft.title)
    .bind(&draft.description)
    .bind(timestamp::format_stored(draft.scheduled_time))
    .bind(&draft.recipient_override)
    .fetch_optional(db)
    .await
    .context("update reminder")?;
    Ok(row)
}

pub async fn delete_for_user(db: &PgPool, user_id: Uuid, reminder_id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM reminders WHERE id = $1 AND user_id = $2")
        .bind(reminder_id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete reminder")?;
    Ok(res.rows_affected() > 0)
}

/// Targeted completion flip. A row rescheduled since it was read is left untouched.
pub async fn mark_completed(
    db: &PgPool,
    reminder_id: Uuid,
    scheduled_time: &str,
) -> anyhow::Result<bool> {
    let res = sqlx::query(
        "UPDATE reminders SET completed = TRUE WHERE id = $1 AND scheduled_time = $2",
    )
    .bind(reminder_id)
    .bind(scheduled_time)
    .execute(db)
    .await
    .context("mark reminder completed")?;
    Ok(res.rows_affected() > 0)
}
