use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, LoginRequest, MailCredentialsRequest, PublicUser, RefreshRequest,
            RegisterRequest,
        },
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password, is_acceptable_password, verify_password},
        repo_types::User,
        services::{is_valid_email, issue_tokens, normalize_email},
    },
    state::AppState,
};

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/me/mail-credentials", put(update_mail_credentials))
}

fn internal(context: &'static str) -> impl FnOnce(anyhow::Error) -> (StatusCode, String) {
    move |e| {
        error!(error = %e, "{context} failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> ApiResult<AuthResponse> {
    payload.email = normalize_email(&payload.email);
    payload.username = payload.username.trim().to_string();

    if payload.username.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Username is required".into()));
    }

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    if !is_acceptable_password(&payload.password) {
        warn!("password too short");
        return Err((StatusCode::BAD_REQUEST, "Password too short".into()));
    }

    let existing = User::find_by_email(&state.db, &payload.email)
        .await
        .map_err(internal("find_by_email"))?;
    if existing.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err((StatusCode::CONFLICT, "Email already registered".into()));
    }

    let hash = hash_password(&payload.password).map_err(internal("hash_password"))?;
    let user = User::create(&state.db, &payload.username, &payload.email, &hash)
        .await
        .map_err(internal("create user"))?;

    let resp = issue_tokens(&JwtKeys::from_ref(&state), &user).map_err(internal("jwt sign"))?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(resp))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    payload.email = normalize_email(&payload.email);

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    let user = match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "login unknown email");
            return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
        }
        Err(e) => return Err(internal("find_by_email")(e)),
    };

    let ok = verify_password(&payload.password, &user.password_hash)
        .map_err(internal("verify_password"))?;
    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    }

    let resp = issue_tokens(&JwtKeys::from_ref(&state), &user).map_err(internal("jwt sign"))?;
    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(resp))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<AuthResponse> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| (StatusCode::UNAUTHORIZED, e.to_string()))?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await
        .map_err(internal("find_by_id"))?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    let resp = issue_tokens(&keys, &user).map_err(internal("jwt sign"))?;
    Ok(Json(resp))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<PublicUser> {
    let user = User::find_by_id(&state.db, user_id)
        .await
        .map_err(internal("find_by_id"))?
        .ok_or_else(|| {
            warn!(user_id = %user_id, "user not found");
            (StatusCode::UNAUTHORIZED, "User not found".to_string())
        })?;

    Ok(Json(PublicUser::from(&user)))
}

/// Both fields are required; the sender address doubles as the login email.
#[instrument(skip(state, payload))]
pub async fn update_mail_credentials(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<MailCredentialsRequest>,
) -> ApiResult<PublicUser> {
    let email = normalize_email(&payload.email);
    let app_password = payload.app_password.trim();

    if email.is_empty() || app_password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Please provide both email and app password".into(),
        ));
    }
    if !is_valid_email(&email) {
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    let owner = User::find_by_email(&state.db, &email)
        .await
        .map_err(internal("find_by_email"))?;
    if owner.is_some_and(|u| u.id != user_id) {
        warn!(user_id = %user_id, email = %email, "mail address belongs to another account");
        return Err((StatusCode::CONFLICT, "Email already registered".into()));
    }

    let user = User::update_mail_credentials(&state.db, user_id, &email, app_password)
        .await
        .map_err(internal("update_mail_credentials"))?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))?;

    info!(user_id = %user.id, "mail credentials updated");
    Ok(Json(PublicUser::from(&user)))
}
