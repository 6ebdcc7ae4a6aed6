use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttendanceMethod {
    CardScan,
    ManualEntry,
    MobileApp,
    QrCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    CheckedIn,
    CheckedOut,
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub event_id: Uuid,
    pub member_id: Uuid,
    pub member_name: String,
    pub recorded_at: DateTime<Utc>,
    pub method: AttendanceMethod,
    pub status: AttendanceStatus,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub device_id: Option<Uuid>,
    pub recorded_by: Option<Uuid>,
    pub family_of: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct CreateRecordData {
    pub event_id: Uuid,
    pub member_id: Uuid,
    pub member_name: String,
    pub method: AttendanceMethod,
    pub device_id: Option<Uuid>,
    pub recorded_by: Option<Uuid>,
    pub family_of: Option<Uuid>,
}

/// Filters for the attendance list endpoint
#[derive(Debug, Clone, Default)]
pub struct RecordListFilter {
    pub event_id: Option<Uuid>,
    pub member_id: Option<Uuid>,
    pub status: Option<AttendanceStatus>,
    pub limit: i64,
    pub offset: i64,
}

impl AttendanceRecord {
    /// Inserts a new attendance record (checked_in)
    pub async fn create(pool: &PgPool, data: CreateRecordData) -> Result<Self, sqlx::Error> {
        let record = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO attendance_records (
                event_id, member_id, member_name, method,
                device_id, recorded_by, family_of
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(data.event_id)
        .bind(data.member_id)
        .bind(&data.member_name)
        .bind(data.method)
        .bind(data.device_id)
        .bind(data.recorded_by)
        .bind(data.family_of)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Finds a record by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let record = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM attendance_records WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Finds a member's open check-in for an event, if any
    pub async fn find_checked_in(
        pool: &PgPool,
        event_id: Uuid,
        member_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let record = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM attendance_records
            WHERE event_id = $1 AND member_id = $2 AND status = 'checked_in'
            "#,
        )
        .bind(event_id)
        .bind(member_id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Lists records matching the filter, newest first
    pub async fn list(pool: &PgPool, filter: RecordListFilter) -> Result<Vec<Self>, sqlx::Error> {
        let records = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM attendance_records
            WHERE ($1::uuid IS NULL OR event_id = $1)
              AND ($2::uuid IS NULL OR member_id = $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY recorded_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filter.event_id)
        .bind(filter.member_id)
        .bind(filter.status)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Lists every record for an event (roll-call reconciliation)
    pub async fn list_for_event(pool: &PgPool, event_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let records = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM attendance_records
            WHERE event_id = $1
            ORDER BY recorded_at
            "#,
        )
        .bind(event_id)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Transitions a record to checked_out
    pub async fn mark_checked_out(
        pool: &PgPool,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE attendance_records
            SET status = 'checked_out', checked_out_at = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Closes open check-ins for events whose late window has passed,
    /// stamping the event end as the check-out time. Returns affected rows.
    pub async fn close_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE attendance_records r
            SET status = 'checked_out', checked_out_at = e.ends_at
            FROM attendance_events e
            WHERE r.event_id = e.id
              AND r.status = 'checked_in'
              AND e.ends_at + e.late_check_in_minutes * INTERVAL '1 minute' < NOW()
            "#,
        )
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
