use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

/// Which direction a branch sees a transfer from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferDirection {
    Incoming,
    Outgoing,
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransferRequest {
    pub id: Uuid,
    pub member_id: Uuid,
    pub from_branch_id: Uuid,
    pub to_branch_id: Uuid,
    pub status: TransferStatus,
    pub reason: Option<String>,
    pub transfer_data: Vec<String>,
    pub requested_by: Option<Uuid>,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateTransferData {
    pub member_id: Uuid,
    pub from_branch_id: Uuid,
    pub to_branch_id: Uuid,
    pub reason: Option<String>,
    pub transfer_data: Vec<String>,
    pub requested_by: Option<Uuid>,
}

impl TransferRequest {
    /// Creates a new pending transfer request
    pub async fn create(pool: &PgPool, data: CreateTransferData) -> Result<Self, sqlx::Error> {
        let request = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO transfer_requests (
                member_id, from_branch_id, to_branch_id, reason, transfer_data, requested_by
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(data.member_id)
        .bind(data.from_branch_id)
        .bind(data.to_branch_id)
        .bind(&data.reason)
        .bind(&data.transfer_data)
        .bind(data.requested_by)
        .fetch_one(pool)
        .await?;

        Ok(request)
    }

    /// Finds a transfer request by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let request = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM transfer_requests WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(request)
    }

    /// Lists transfer requests a branch is involved in
    pub async fn list_for_branch(
        pool: &PgPool,
        branch_id: Uuid,
        direction: TransferDirection,
        status: Option<TransferStatus>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = match direction {
            TransferDirection::Incoming => {
                r#"
                SELECT * FROM transfer_requests
                WHERE to_branch_id = $1 AND ($2::text IS NULL OR status = $2)
                ORDER BY created_at DESC
                "#
            }
            TransferDirection::Outgoing => {
                r#"
                SELECT * FROM transfer_requests
                WHERE from_branch_id = $1 AND ($2::text IS NULL OR status = $2)
                ORDER BY created_at DESC
                "#
            }
            TransferDirection::All => {
                r#"
                SELECT * FROM transfer_requests
                WHERE (from_branch_id = $1 OR to_branch_id = $1)
                  AND ($2::text IS NULL OR status = $2)
                ORDER BY created_at DESC
                "#
            }
        };

        let requests = sqlx::query_as::<_, Self>(query)
            .bind(branch_id)
            .bind(status)
            .fetch_all(pool)
            .await?;

        Ok(requests)
    }

    /// Records an approve/reject decision
    pub async fn set_decision(
        pool: &PgPool,
        id: Uuid,
        status: TransferStatus,
        decided_by: Option<Uuid>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE transfer_requests
            SET status = $2, decided_by = $3, decided_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(decided_by)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Deletes a transfer request
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            DELETE FROM transfer_requests WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }
}
