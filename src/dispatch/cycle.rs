use serde::Serialize;
use thiserror::Error;
use time::PrimitiveDateTime;
use tracing::{debug, error, info, instrument, trace, warn};
use uuid::Uuid;

use crate::{
    notifier::{Notifier, ReminderEmail, SendError},
    reminders::repo_types::Reminder,
    store::RecordStore,
};

/// Counts for one cycle. Completed reminders are not counted at all.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// The cycle could not run at all; nothing was sent.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("record store unavailable: {0:#}")]
    StoreUnavailable(anyhow::Error),
}

/// Why a pending reminder was left alone this cycle.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("scheduled time {raw:?} is not YYYY-MM-DD HH:MM:SS")]
    MalformedRecord { raw: String },
    #[error("not due until {0}")]
    NotDue(PrimitiveDateTime),
    #[error("owning user {0} does not exist")]
    OrphanedReminder(Uuid),
    #[error("owning user {user_id} could not be loaded: {cause}")]
    OwnerUnavailable { user_id: Uuid, cause: String },
    #[error("owning user {0} has no mail credentials configured")]
    MissingCredentials(Uuid),
}

#[derive(Debug, Error)]
pub enum DispatchFailure {
    #[error(transparent)]
    Send(#[from] SendError),
}

/// Completion could not be recorded after the mail went out.
#[derive(Debug, Error)]
pub enum StoreWriteError {
    #[error("reminder {0} was deleted or rescheduled while it was being sent")]
    Changed(Uuid),
    #[error("marking reminder {id} completed failed: {cause}")]
    Write { id: Uuid, cause: String },
}

enum Outcome {
    Sent,
    Skipped(SkipReason),
    Failed(DispatchFailure),
}

/// One scan-and-send pass over every stored reminder.
///
/// Completion state is read fresh from `store` on every call. A failure on
/// one reminder is counted and logged and never stops the rest of the scan;
/// only an unreadable reminder collection fails the whole cycle.
pub async fn run(
    store: &dyn RecordStore,
    notifier: &dyn Notifier,
    now: PrimitiveDateTime,
) -> Result<DispatchReport, CycleError> {
    let reminders = store
        .list_all_reminders()
        .await
        .map_err(CycleError::StoreUnavailable)?;

    let mut report = DispatchReport::default();
    for reminder in reminders.iter().filter(|r| !r.completed) {
        match dispatch_one(store, notifier, reminder, now).await {
            Outcome::Sent => report.sent += 1,
            Outcome::Skipped(reason) => {
                match &reason {
                    SkipReason::NotDue(_) => trace!(reminder_id = %reminder.id, %reason, "skipped"),
                    SkipReason::MissingCredentials(_) => {
                        info!(reminder_id = %reminder.id, %reason, "left pending")
                    }
                    SkipReason::MalformedRecord { .. }
                    | SkipReason::OrphanedReminder(_)
                    | SkipReason::OwnerUnavailable { .. } => {
                        warn!(reminder_id = %reminder.id, %reason, "skipped")
                    }
                }
                report.skipped += 1;
            }
            Outcome::Failed(e) => {
                warn!(reminder_id = %reminder.id, error = %e, "dispatch failed; will retry next cycle");
                report.failed += 1;
            }
        }
    }

    info!(
        sent = report.sent,
        skipped = report.skipped,
        failed = report.failed,
        "dispatch cycle finished"
    );
    Ok(report)
}

#[instrument(skip_all, fields(reminder_id = %reminder.id))]
async fn dispatch_one(
    store: &dyn RecordStore,
    notifier: &dyn Notifier,
    reminder: &Reminder,
    now: PrimitiveDateTime,
) -> Outcome {
    let Ok(scheduled_time) = reminder.scheduled_at() else {
        return Outcome::Skipped(SkipReason::MalformedRecord {
            raw: reminder.scheduled_time.clone(),
        });
    };
    if scheduled_time > now {
        return Outcome::Skipped(SkipReason::NotDue(scheduled_time));
    }

    let owner = match store.get_user(reminder.user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return Outcome::Skipped(SkipReason::OrphanedReminder(reminder.user_id)),
        Err(e) => {
            return Outcome::Skipped(SkipReason::OwnerUnavailable {
                user_id: reminder.user_id,
                cause: format!("{e:#}"),
            })
        }
    };
    if !owner.has_mail_credentials() {
        return Outcome::Skipped(SkipReason::MissingCredentials(owner.id));
    }

    let email = ReminderEmail {
        sender_email: &owner.email,
        sender_credential: &owner.mail_credential,
        recipient_email: reminder.recipient(&owner),
        title: &reminder.title,
        description: reminder.description.as_deref(),
        scheduled_time,
    };
    if let Err(e) = notifier.send(&email).await {
        return Outcome::Failed(e.into());
    }
    debug!(recipient = %email.recipient_email, "reminder mailed");

    // Only the version that was mailed is flagged; a rescheduled reminder stays pending.
    match store
        .set_reminder_completed(reminder.id, &reminder.scheduled_time)
        .await
    {
        Ok(true) => {}
        Ok(false) => {
            let e = StoreWriteError::Changed(reminder.id);
            warn!(error = %e, "reminder sent but left pending");
        }
        Err(e) => {
            let e = StoreWriteError::Write {
                id: reminder.id,
                cause: format!("{e:#}"),
            };
            error!(error = %e, "reminder sent but not marked completed; it may be sent again");
        }
    }
    Outcome::Sent
}
