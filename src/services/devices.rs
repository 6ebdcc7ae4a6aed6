use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{
    branch::Branch,
    device::{CardDevice, CreateDeviceData, DeviceStatus, DeviceType},
};

/// A freshly registered device together with its API key. The key is only
/// shown once, at registration time.
#[derive(Debug, serde::Serialize)]
pub struct RegisteredDevice {
    #[serde(flatten)]
    pub device: CardDevice,
    pub api_key: String,
}

/// Registers a new check-in device for a branch, minting its API key.
#[tracing::instrument(skip(pool, name, location), fields(branch_id = %branch_id))]
pub async fn register_device(
    pool: &PgPool,
    branch_id: Uuid,
    name: &str,
    location: Option<String>,
    device_type: DeviceType,
) -> Result<RegisteredDevice> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Device name is required".to_string()));
    }

    Branch::find_by_id(pool, branch_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Branch not found".to_string()))?;

    let api_key = format!(
        "{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    );

    let device = CardDevice::create(
        pool,
        CreateDeviceData {
            name: name.to_string(),
            branch_id,
            location,
            device_type,
            api_key: api_key.clone(),
        },
    )
    .await?;

    tracing::info!(device_id = %device.id, device_type = ?device.device_type, "Device registered");

    Ok(RegisteredDevice { device, api_key })
}

/// Updates a device's status and optionally its battery level.
pub async fn update_device_status(
    pool: &PgPool,
    id: Uuid,
    status: DeviceStatus,
    battery_level: Option<i16>,
) -> Result<CardDevice> {
    if let Some(level) = battery_level {
        if !(0..=100).contains(&level) {
            return Err(AppError::Validation(
                "Battery level must be between 0 and 100".to_string(),
            ));
        }
    }

    CardDevice::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Device not found".to_string()))?;

    CardDevice::set_status(pool, id, status, battery_level).await?;

    CardDevice::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Device not found".to_string()))
}

/// Authenticates a scan request by device API key.
pub async fn authenticate_device(pool: &PgPool, api_key: &str) -> Result<CardDevice> {
    let device = CardDevice::find_by_api_key(pool, api_key)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if device.status == DeviceStatus::Maintenance {
        return Err(AppError::Conflict(
            "Device is under maintenance".to_string(),
        ));
    }

    Ok(device)
}
