use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    None,
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceEvent {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub name: String,
    pub event_type: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub recurrence: Recurrence,
    pub early_check_in_minutes: i32,
    pub late_check_in_minutes: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventData {
    pub branch_id: Uuid,
    pub name: String,
    pub event_type: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub recurrence: Option<Recurrence>,
    pub early_check_in_minutes: Option<i32>,
    pub late_check_in_minutes: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEventData {
    pub name: Option<String>,
    pub event_type: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub recurrence: Option<Recurrence>,
    pub early_check_in_minutes: Option<i32>,
    pub late_check_in_minutes: Option<i32>,
}

impl AttendanceEvent {
    /// Creates a new attendance event
    pub async fn create(pool: &PgPool, data: CreateEventData) -> Result<Self, sqlx::Error> {
        let event = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO attendance_events (
                branch_id, name, event_type, starts_at, ends_at,
                recurrence, early_check_in_minutes, late_check_in_minutes
            )
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'none'), COALESCE($7, 0), COALESCE($8, 0))
            RETURNING *
            "#,
        )
        .bind(data.branch_id)
        .bind(&data.name)
        .bind(&data.event_type)
        .bind(data.starts_at)
        .bind(data.ends_at)
        .bind(data.recurrence)
        .bind(data.early_check_in_minutes)
        .bind(data.late_check_in_minutes)
        .fetch_one(pool)
        .await?;

        Ok(event)
    }

    /// Finds an event by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let event = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM attendance_events WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(event)
    }

    /// Lists events for a branch, newest first
    pub async fn list_by_branch(
        pool: &PgPool,
        branch_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = if active_only {
            r#"
            SELECT * FROM attendance_events
            WHERE branch_id = $1 AND is_active = TRUE
            ORDER BY starts_at DESC
            "#
        } else {
            r#"
            SELECT * FROM attendance_events
            WHERE branch_id = $1
            ORDER BY starts_at DESC
            "#
        };

        let events = sqlx::query_as::<_, Self>(query)
            .bind(branch_id)
            .fetch_all(pool)
            .await?;

        Ok(events)
    }

    /// Updates an event; absent fields keep their current value
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateEventData,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE attendance_events
            SET
                name = COALESCE($2, name),
                event_type = COALESCE($3, event_type),
                starts_at = COALESCE($4, starts_at),
                ends_at = COALESCE($5, ends_at),
                recurrence = COALESCE($6, recurrence),
                early_check_in_minutes = COALESCE($7, early_check_in_minutes),
                late_check_in_minutes = COALESCE($8, late_check_in_minutes),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.event_type)
        .bind(data.starts_at)
        .bind(data.ends_at)
        .bind(data.recurrence)
        .bind(data.early_check_in_minutes)
        .bind(data.late_check_in_minutes)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Deactivates an event (soft delete)
    pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE attendance_events
            SET is_active = FALSE, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }
}
