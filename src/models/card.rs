use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    Active,
    Inactive,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Rfid,
    Nfc,
    Qr,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MemberCard {
    pub id: Uuid,
    pub member_id: Uuid,
    pub card_number: String,
    pub card_type: CardType,
    pub status: CardStatus,
    pub issued_at: DateTime<Utc>,
    pub last_used: Option<DateTime<Utc>>,
    pub deactivated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct CreateCardData {
    pub member_id: Uuid,
    pub card_number: String,
    pub card_type: CardType,
}

impl MemberCard {
    /// Creates a new active card
    pub async fn create(pool: &PgPool, data: CreateCardData) -> Result<Self, sqlx::Error> {
        let card = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO member_cards (member_id, card_number, card_type)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(data.member_id)
        .bind(&data.card_number)
        .bind(data.card_type)
        .fetch_one(pool)
        .await?;

        Ok(card)
    }

    /// Finds a card by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let card = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM member_cards WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(card)
    }

    /// Finds the most recently issued card carrying a card number,
    /// regardless of status
    pub async fn find_by_number(
        pool: &PgPool,
        card_number: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let card = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM member_cards
            WHERE card_number = $1
            ORDER BY issued_at DESC
            LIMIT 1
            "#,
        )
        .bind(card_number)
        .fetch_optional(pool)
        .await?;

        Ok(card)
    }

    /// Finds the active card carrying a card number
    pub async fn find_active_by_number(
        pool: &PgPool,
        card_number: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let card = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM member_cards
            WHERE card_number = $1 AND status = 'active'
            "#,
        )
        .bind(card_number)
        .fetch_optional(pool)
        .await?;

        Ok(card)
    }

    /// Finds a member's current active card
    pub async fn find_active_by_member(
        pool: &PgPool,
        member_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let card = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM member_cards
            WHERE member_id = $1 AND status = 'active'
            ORDER BY issued_at DESC
            LIMIT 1
            "#,
        )
        .bind(member_id)
        .fetch_optional(pool)
        .await?;

        Ok(card)
    }

    /// Lists all cards ever issued to a member, newest first
    pub async fn list_by_member(pool: &PgPool, member_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let cards = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM member_cards
            WHERE member_id = $1
            ORDER BY issued_at DESC
            "#,
        )
        .bind(member_id)
        .fetch_all(pool)
        .await?;

        Ok(cards)
    }

    /// Sets a card's status; leaving `active` stamps `deactivated_at`
    pub async fn set_status(
        pool: &PgPool,
        id: Uuid,
        status: CardStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE member_cards
            SET status = $2,
                deactivated_at = CASE WHEN $2 = 'active' THEN NULL ELSE NOW() END
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Stamps the card's last scan time
    pub async fn touch_last_used(
        pool: &PgPool,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE member_cards
            SET last_used = $2
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
