use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{ReminderRequest, ReminderResponse},
    repo,
    services::validate,
};
use crate::{auth::extractors::AuthUser, state::AppState};

pub fn reminder_routes() -> Router<AppState> {
    Router::new()
        .route("/reminders", get(list_reminders).post(create_reminder))
        .route(
            "/reminders/:id",
            get(get_reminder).put(update_reminder).delete(delete_reminder),
        )
}

#[instrument(skip(state))]
pub async fn list_reminders(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<ReminderResponse>>, (StatusCode, String)> {
    let rows = repo::list_by_user(&state.db, user_id)
        .await
        .map_err(internal)?;
    Ok(Json(rows.into_iter().map(ReminderResponse::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ReminderRequest>,
) -> Result<(StatusCode, Json<ReminderResponse>), (StatusCode, String)> {
    let draft = validate(payload).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let reminder = repo::insert(&state.db, user_id, &draft)
        .await
        .map_err(internal)?;
    info!(%user_id, reminder_id = %reminder.id, scheduled_time = %reminder.scheduled_time, "reminder created");
    Ok((StatusCode::CREATED, Json(reminder.into())))
}

#[instrument(skip(state))]
pub async fn get_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ReminderResponse>, (StatusCode, String)> {
    match repo::get_for_user(&state.db, user_id, id).await {
        Ok(Some(r)) => Ok(Json(r.into())),
        Ok(None) => Err(not_found()),
        Err(e) => Err(internal(e)),
    }
}

/// Edits are only allowed while the reminder has not been sent.
#[instrument(skip(state, payload))]
pub async fn update_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReminderRequest>,
) -> Result<Json<ReminderResponse>, (StatusCode, String)> {
    let draft = validate(payload).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    if let Some(updated) = repo::update_pending(&state.db, user_id, id, &draft)
        .await
        .map_err(internal)?
    {
        info!(%user_id, reminder_id = %id, "reminder updated");
        return Ok(Json(updated.into()));
    }

    // Nothing matched: tell a missing reminder apart from an already sent one.
    match repo::get_for_user(&state.db, user_id, id).await {
        Ok(Some(_)) => {
            warn!(%user_id, reminder_id = %id, "edit rejected, reminder already sent");
            Err((StatusCode::CONFLICT, "Reminder already sent".into()))
        }
        Ok(None) => Err(not_found()),
        Err(e) => Err(internal(e)),
    }
}

#[instrument(skip(state))]
pub async fn delete_reminder(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if repo::delete_for_user(&state.db, user_id, id)
        .await
        .map_err(internal)?
    {
        info!(%user_id, reminder_id = %id, "reminder deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}

fn not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "Reminder not found".into())
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "reminder store error");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
