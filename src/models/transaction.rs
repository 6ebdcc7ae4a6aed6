use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Tithe,
    Offering,
    Donation,
    Expense,
}

impl TransactionType {
    pub fn is_expense(&self) -> bool {
        matches!(self, TransactionType::Expense)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FinancialTransaction {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub member_id: Option<Uuid>,
    pub transaction_type: TransactionType,
    pub amount_cents: i64,
    pub currency: String,
    pub note: Option<String>,
    pub occurred_on: NaiveDate,
    pub recorded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateTransactionData {
    pub branch_id: Uuid,
    pub member_id: Option<Uuid>,
    pub transaction_type: TransactionType,
    pub amount_cents: i64,
    pub currency: Option<String>,
    pub note: Option<String>,
    pub occurred_on: NaiveDate,
    pub recorded_by: Option<Uuid>,
}

/// Filters for the transaction list endpoint
#[derive(Debug, Clone, Default)]
pub struct TransactionListFilter {
    pub branch_id: Option<Uuid>,
    pub transaction_type: Option<TransactionType>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: i64,
    pub offset: i64,
}

impl FinancialTransaction {
    /// Records a financial transaction
    pub async fn create(pool: &PgPool, data: CreateTransactionData) -> Result<Self, sqlx::Error> {
        let tx = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO financial_transactions (
                branch_id, member_id, transaction_type, amount_cents,
                currency, note, occurred_on, recorded_by
            )
            VALUES ($1, $2, $3, $4, COALESCE($5, 'USD'), $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(data.branch_id)
        .bind(data.member_id)
        .bind(data.transaction_type)
        .bind(data.amount_cents)
        .bind(&data.currency)
        .bind(&data.note)
        .bind(data.occurred_on)
        .bind(data.recorded_by)
        .fetch_one(pool)
        .await?;

        Ok(tx)
    }

    /// Lists transactions matching the filter, most recent first
    pub async fn list(
        pool: &PgPool,
        filter: TransactionListFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let transactions = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM financial_transactions
            WHERE ($1::uuid IS NULL OR branch_id = $1)
              AND ($2::text IS NULL OR transaction_type = $2)
              AND ($3::date IS NULL OR occurred_on >= $3)
              AND ($4::date IS NULL OR occurred_on <= $4)
            ORDER BY occurred_on DESC, created_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(filter.branch_id)
        .bind(filter.transaction_type)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(pool)
        .await?;

        Ok(transactions)
    }
}
