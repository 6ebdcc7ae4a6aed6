use axum::{extract::State, routing::get, routing::post, Json, Router};
use serde::Deserialize;
use tower_sessions::Session;

use crate::api::middleware::{
    auth::get_authenticated_staff,
    session::{AppState, SESSION_KEY_STAFF_ID},
};
use crate::error::{AppError, Result};
use crate::models::staff::StaffAccount;
use crate::services::passwords;

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<StaffAccount>> {
    let account = StaffAccount::find_by_email(&state.pool, request.email.trim())
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = passwords::verify(&request.password, &account.password_hash)
        .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;

    if !valid {
        tracing::warn!(email = %request.email, "Failed login attempt");
        return Err(AppError::Unauthorized);
    }

    session
        .insert(SESSION_KEY_STAFF_ID, account.id)
        .await
        .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;

    tracing::info!(staff_id = %account.id, "Staff logged in");

    Ok(Json(account))
}

async fn logout(session: Session) -> Result<Json<serde_json::Value>> {
    session
        .flush()
        .await
        .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;

    Ok(Json(serde_json::json!({ "logged_out": true })))
}

async fn me(State(state): State<AppState>, session: Session) -> Result<Json<StaffAccount>> {
    let staff = get_authenticated_staff(&session)
        .await
        .map_err(|_| AppError::Unauthorized)?;

    let account = StaffAccount::find_by_id(&state.pool, staff.staff_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(account))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}
