use axum::{
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::middleware::session::AppState;
use crate::error::{AppError, Result};
use crate::models::attendance::AttendanceRecord;
use crate::models::device::CardDevice;
use crate::services::{card_token, check_in, devices};

const DEVICE_KEY_HEADER: &str = "x-device-key";

async fn device_from_headers(state: &AppState, headers: &HeaderMap) -> Result<CardDevice> {
    let api_key = headers
        .get(DEVICE_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    devices::authenticate_device(&state.pool, api_key).await
}

#[derive(Debug, Deserialize)]
struct ScanCheckInBody {
    event_id: Uuid,
    /// Physical card number (RFID/NFC scan)
    card_number: Option<String>,
    /// Signed QR payload (QR scan)
    token: Option<String>,
    battery_level: Option<i16>,
}

/// Card-scan check-in from a registered device. Accepts either a raw card
/// number or a signed QR token.
async fn scan_check_in(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ScanCheckInBody>,
) -> Result<Json<AttendanceRecord>> {
    let device = device_from_headers(&state, &headers).await?;
    CardDevice::touch(&state.pool, device.id, body.battery_level).await?;

    let card_number = match (body.card_number, body.token) {
        (Some(number), _) => number,
        (None, Some(token)) => {
            let key = card_token::derive_key(state.config.card_signing_secret.expose_secret());
            let payload = card_token::decode(&token, &key)
                .map_err(|_| AppError::Validation("Invalid card token".to_string()))?;
            payload.card_number
        }
        (None, None) => {
            return Err(AppError::Validation(
                "Either card_number or token is required".to_string(),
            ));
        }
    };

    let record =
        check_in::record_card_scan(&state.pool, body.event_id, &card_number, Some(device.id))
            .await?;

    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
struct HeartbeatBody {
    battery_level: Option<i16>,
}

async fn heartbeat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<HeartbeatBody>,
) -> Result<Json<serde_json::Value>> {
    let device = device_from_headers(&state, &headers).await?;

    CardDevice::touch(&state.pool, device.id, body.battery_level).await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/scan/check-in", post(scan_check_in))
        .route("/scan/heartbeat", post(heartbeat))
}
