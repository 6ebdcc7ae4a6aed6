use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

use crate::api::middleware::{auth::get_authenticated_staff, session::AppState};
use crate::error::{AppError, Result};
use crate::models::transaction::{
    CreateTransactionData, FinancialTransaction, TransactionListFilter, TransactionType,
};
use crate::services::analytics::{self, FinanceSummary};
use crate::services::periods::Timeframe;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 500;

#[derive(Debug, Deserialize)]
struct ListTransactionsQuery {
    branch_id: Option<Uuid>,
    transaction_type: Option<TransactionType>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    page: Option<i64>,
    per_page: Option<i64>,
}

async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<Vec<FinancialTransaction>>> {
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let page = query.page.unwrap_or(1).max(1);

    let transactions = FinancialTransaction::list(
        &state.pool,
        TransactionListFilter {
            branch_id: query.branch_id,
            transaction_type: query.transaction_type,
            from: query.from,
            to: query.to,
            limit: per_page,
            offset: (page - 1) * per_page,
        },
    )
    .await?;

    Ok(Json(transactions))
}

#[derive(Debug, Deserialize)]
struct CreateTransactionBody {
    branch_id: Uuid,
    member_id: Option<Uuid>,
    transaction_type: TransactionType,
    amount_cents: i64,
    currency: Option<String>,
    note: Option<String>,
    occurred_on: NaiveDate,
}

async fn create_transaction(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CreateTransactionBody>,
) -> Result<Json<FinancialTransaction>> {
    let staff = get_authenticated_staff(&session)
        .await
        .map_err(|_| AppError::Unauthorized)?;

    if body.amount_cents <= 0 {
        return Err(AppError::Validation(
            "Amount must be positive".to_string(),
        ));
    }

    let transaction = FinancialTransaction::create(
        &state.pool,
        CreateTransactionData {
            branch_id: body.branch_id,
            member_id: body.member_id,
            transaction_type: body.transaction_type,
            amount_cents: body.amount_cents,
            currency: body.currency,
            note: body.note,
            occurred_on: body.occurred_on,
            recorded_by: Some(staff.staff_id),
        },
    )
    .await?;

    tracing::info!(
        transaction_id = %transaction.id,
        transaction_type = ?transaction.transaction_type,
        "Transaction recorded"
    );

    Ok(Json(transaction))
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    branch_id: Uuid,
    timeframe: Timeframe,
}

async fn finance_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<FinanceSummary>> {
    let summary =
        analytics::finance_summary(&state.pool, query.branch_id, query.timeframe, Utc::now())
            .await?;

    Ok(Json(summary))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/finance/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route("/finance/summary", get(finance_summary))
}
