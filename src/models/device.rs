use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Online,
    Offline,
    Maintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    WallMounted,
    Kiosk,
    Mobile,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CardDevice {
    pub id: Uuid,
    pub name: String,
    pub branch_id: Uuid,
    pub location: Option<String>,
    pub device_type: DeviceType,
    pub status: DeviceStatus,
    pub battery_level: Option<i16>,
    #[serde(skip_serializing)]
    pub api_key: String,
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateDeviceData {
    pub name: String,
    pub branch_id: Uuid,
    pub location: Option<String>,
    pub device_type: DeviceType,
    pub api_key: String,
}

impl CardDevice {
    /// Registers a new check-in device
    pub async fn create(pool: &PgPool, data: CreateDeviceData) -> Result<Self, sqlx::Error> {
        let device = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO card_devices (name, branch_id, location, device_type, api_key)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(data.branch_id)
        .bind(&data.location)
        .bind(data.device_type)
        .bind(&data.api_key)
        .fetch_one(pool)
        .await?;

        Ok(device)
    }

    /// Finds a device by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let device = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM card_devices WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(device)
    }

    /// Finds a device by its API key (scan endpoint authentication)
    pub async fn find_by_api_key(pool: &PgPool, api_key: &str) -> Result<Option<Self>, sqlx::Error> {
        let device = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM card_devices WHERE api_key = $1
            "#,
        )
        .bind(api_key)
        .fetch_optional(pool)
        .await?;

        Ok(device)
    }

    /// Lists devices, optionally scoped to a branch
    pub async fn list(pool: &PgPool, branch_id: Option<Uuid>) -> Result<Vec<Self>, sqlx::Error> {
        let devices = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM card_devices
            WHERE $1::uuid IS NULL OR branch_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(branch_id)
        .fetch_all(pool)
        .await?;

        Ok(devices)
    }

    /// Updates device status and (optionally) battery level
    pub async fn set_status(
        pool: &PgPool,
        id: Uuid,
        status: DeviceStatus,
        battery_level: Option<i16>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE card_devices
            SET status = $2, battery_level = COALESCE($3, battery_level)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(battery_level)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Records a heartbeat: stamps last_seen and brings the device online
    /// unless it is flagged for maintenance
    pub async fn touch(
        pool: &PgPool,
        id: Uuid,
        battery_level: Option<i16>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE card_devices
            SET last_seen = NOW(),
                battery_level = COALESCE($2, battery_level),
                status = CASE WHEN status = 'maintenance' THEN status ELSE 'online' END
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(battery_level)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Marks devices offline when their last heartbeat is older than the
    /// cutoff. Maintenance devices are left alone. Returns affected rows.
    pub async fn mark_stale_offline(
        pool: &PgPool,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE card_devices
            SET status = 'offline'
            WHERE status = 'online'
              AND (last_seen IS NULL OR last_seen < $1)
            "#,
        )
        .bind(cutoff)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
