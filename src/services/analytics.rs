use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{attendance::AttendanceMethod, transaction::TransactionType};
use crate::services::periods::{period_bounds, Timeframe};

#[derive(Debug, Serialize, FromRow)]
pub struct MethodCount {
    pub method: AttendanceMethod,
    pub count: i64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct AttendanceSummary {
    pub timeframe: Timeframe,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub total_check_ins: i64,
    pub unique_members: i64,
    pub by_method: Vec<MethodCount>,
    pub daily: Vec<DailyCount>,
}

/// Aggregates a branch's attendance over the selected timeframe.
#[tracing::instrument(skip(pool), fields(branch_id = %branch_id))]
pub async fn attendance_summary(
    pool: &PgPool,
    branch_id: Uuid,
    timeframe: Timeframe,
    now: DateTime<Utc>,
) -> Result<AttendanceSummary> {
    let (start, end) = period_bounds(timeframe, now);

    let (total_check_ins, unique_members): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COUNT(DISTINCT r.member_id)
        FROM attendance_records r
        JOIN attendance_events e ON e.id = r.event_id
        WHERE e.branch_id = $1
          AND r.recorded_at BETWEEN $2 AND $3
        "#,
    )
    .bind(branch_id)
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;

    let by_method = sqlx::query_as::<_, MethodCount>(
        r#"
        SELECT r.method, COUNT(*) AS count
        FROM attendance_records r
        JOIN attendance_events e ON e.id = r.event_id
        WHERE e.branch_id = $1
          AND r.recorded_at BETWEEN $2 AND $3
        GROUP BY r.method
        ORDER BY count DESC
        "#,
    )
    .bind(branch_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    let daily = sqlx::query_as::<_, DailyCount>(
        r#"
        SELECT (r.recorded_at AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS count
        FROM attendance_records r
        JOIN attendance_events e ON e.id = r.event_id
        WHERE e.branch_id = $1
          AND r.recorded_at BETWEEN $2 AND $3
        GROUP BY day
        ORDER BY day
        "#,
    )
    .bind(branch_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(AttendanceSummary {
        timeframe,
        start,
        end,
        total_check_ins,
        unique_members,
        by_method,
        daily,
    })
}

#[derive(Debug, Serialize, FromRow)]
pub struct TypeTotal {
    pub transaction_type: TransactionType,
    pub total_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct FinanceSummary {
    pub timeframe: Timeframe,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub income_cents: i64,
    pub expense_cents: i64,
    pub net_cents: i64,
    pub by_type: Vec<TypeTotal>,
}

/// Aggregates a branch's finances over the selected timeframe. Income is
/// everything except expenses; net is income minus expenses.
#[tracing::instrument(skip(pool), fields(branch_id = %branch_id))]
pub async fn finance_summary(
    pool: &PgPool,
    branch_id: Uuid,
    timeframe: Timeframe,
    now: DateTime<Utc>,
) -> Result<FinanceSummary> {
    let (start, end) = period_bounds(timeframe, now);
    let (from, to) = (start.date_naive(), end.date_naive());

    let (income_cents, expense_cents): (i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COALESCE(SUM(amount_cents) FILTER (WHERE transaction_type <> 'expense'), 0)::bigint,
            COALESCE(SUM(amount_cents) FILTER (WHERE transaction_type = 'expense'), 0)::bigint
        FROM financial_transactions
        WHERE branch_id = $1
          AND occurred_on BETWEEN $2 AND $3
        "#,
    )
    .bind(branch_id)
    .bind(from)
    .bind(to)
    .fetch_one(pool)
    .await?;

    let by_type = sqlx::query_as::<_, TypeTotal>(
        r#"
        SELECT transaction_type, COALESCE(SUM(amount_cents), 0)::bigint AS total_cents
        FROM financial_transactions
        WHERE branch_id = $1
          AND occurred_on BETWEEN $2 AND $3
        GROUP BY transaction_type
        ORDER BY total_cents DESC
        "#,
    )
    .bind(branch_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(FinanceSummary {
        timeframe,
        start,
        end,
        income_cents,
        expense_cents,
        net_cents: income_cents - expense_cents,
        by_type,
    })
}
