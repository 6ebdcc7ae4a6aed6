use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StaffAccount {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub branch_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateStaffData {
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub branch_id: Option<Uuid>,
}

impl StaffAccount {
    /// Creates a new staff account
    pub async fn create(pool: &PgPool, data: CreateStaffData) -> Result<Self, sqlx::Error> {
        let account = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO staff_accounts (email, display_name, password_hash, branch_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&data.email)
        .bind(&data.display_name)
        .bind(&data.password_hash)
        .bind(data.branch_id)
        .fetch_one(pool)
        .await?;

        Ok(account)
    }

    /// Finds a staff account by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let account = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM staff_accounts WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    /// Finds an active staff account by email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let account = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM staff_accounts
            WHERE email = $1 AND is_active = TRUE
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }
}
