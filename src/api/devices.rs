use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::middleware::session::AppState;
use crate::error::Result;
use crate::models::device::{CardDevice, DeviceStatus, DeviceType};
use crate::services::devices::{self, RegisteredDevice};

#[derive(Debug, Deserialize)]
struct ListDevicesQuery {
    branch_id: Option<Uuid>,
}

async fn list_devices(
    State(state): State<AppState>,
    Query(query): Query<ListDevicesQuery>,
) -> Result<Json<Vec<CardDevice>>> {
    let devices = CardDevice::list(&state.pool, query.branch_id).await?;

    Ok(Json(devices))
}

#[derive(Debug, Deserialize)]
struct RegisterDeviceBody {
    name: String,
    branch_id: Uuid,
    location: Option<String>,
    device_type: DeviceType,
}

async fn register_device(
    State(state): State<AppState>,
    Json(body): Json<RegisterDeviceBody>,
) -> Result<Json<RegisteredDevice>> {
    let registered = devices::register_device(
        &state.pool,
        body.branch_id,
        &body.name,
        body.location,
        body.device_type,
    )
    .await?;

    Ok(Json(registered))
}

#[derive(Debug, Deserialize)]
struct UpdateDeviceStatusBody {
    status: DeviceStatus,
    battery_level: Option<i16>,
}

async fn update_device_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateDeviceStatusBody>,
) -> Result<Json<CardDevice>> {
    let device =
        devices::update_device_status(&state.pool, id, body.status, body.battery_level).await?;

    Ok(Json(device))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/devices", get(list_devices).post(register_device))
        .route("/devices/:id/status", post(update_device_status))
}
