use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub membership_date: Option<NaiveDate>,
    pub has_card: bool,
    pub card_id: Option<Uuid>,
    pub last_attendance: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMemberData {
    pub branch_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub membership_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMemberData {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub membership_date: Option<NaiveDate>,
}

/// Filters for the member list endpoint
#[derive(Debug, Clone, Default)]
pub struct MemberListFilter {
    pub branch_id: Option<Uuid>,
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Creates a new member record
    pub async fn create(pool: &PgPool, data: CreateMemberData) -> Result<Self, sqlx::Error> {
        let member = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO members (branch_id, first_name, last_name, email, phone, membership_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(data.branch_id)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(data.membership_date)
        .fetch_one(pool)
        .await?;

        Ok(member)
    }

    /// Finds a member by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let member = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM members WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(member)
    }

    /// Lists active members, optionally scoped to a branch and filtered by a
    /// name/email search term, paginated
    pub async fn list(pool: &PgPool, filter: MemberListFilter) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = filter.search.map(|s| format!("%{}%", s.trim()));

        let members = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM members
            WHERE is_active = TRUE
              AND ($1::uuid IS NULL OR branch_id = $1)
              AND ($2::text IS NULL
                   OR first_name ILIKE $2
                   OR last_name ILIKE $2
                   OR email ILIKE $2)
            ORDER BY last_name, first_name
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.branch_id)
        .bind(pattern)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Updates member details; absent fields keep their current value
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateMemberData,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE members
            SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                membership_date = COALESCE($6, membership_date),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.email)
        .bind(data.phone)
        .bind(data.membership_date)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Points the member at their current active card
    pub async fn set_card(pool: &PgPool, id: Uuid, card_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE members
            SET has_card = TRUE, card_id = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(card_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Clears the member's card pointer (card lost or deactivated)
    pub async fn clear_card(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE members
            SET has_card = FALSE, card_id = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Stamps the member's last attendance time
    pub async fn touch_attendance(
        pool: &PgPool,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE members
            SET last_attendance = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(pool)
        .await?;

        Ok(())
    }
}
