use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Branch {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub pastor_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBranchData {
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub pastor_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBranchData {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub pastor_name: Option<String>,
}

impl Branch {
    /// Creates a new branch
    pub async fn create(pool: &PgPool, data: CreateBranchData) -> Result<Self, sqlx::Error> {
        let branch = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO branches (name, address, city, phone, email, pastor_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.address)
        .bind(&data.city)
        .bind(&data.phone)
        .bind(&data.email)
        .bind(&data.pastor_name)
        .fetch_one(pool)
        .await?;

        Ok(branch)
    }

    /// Finds a branch by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let branch = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM branches WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(branch)
    }

    /// Lists branches, newest first
    pub async fn list(pool: &PgPool, active_only: bool) -> Result<Vec<Self>, sqlx::Error> {
        let query = if active_only {
            r#"
            SELECT * FROM branches
            WHERE is_active = TRUE
            ORDER BY created_at DESC
            "#
        } else {
            r#"
            SELECT * FROM branches
            ORDER BY created_at DESC
            "#
        };

        let branches = sqlx::query_as::<_, Self>(query).fetch_all(pool).await?;

        Ok(branches)
    }

    /// Updates branch details; absent fields keep their current value
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateBranchData,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE branches
            SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                city = COALESCE($4, city),
                phone = COALESCE($5, phone),
                email = COALESCE($6, email),
                pastor_name = COALESCE($7, pastor_name),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.address)
        .bind(data.city)
        .bind(data.phone)
        .bind(data.email)
        .bind(data.pastor_name)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Deactivates a branch (soft delete)
    pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE branches
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
