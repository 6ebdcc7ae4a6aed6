use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

use crate::api::middleware::{auth::get_authenticated_staff, session::AppState};
use crate::error::{AppError, Result};
use crate::models::transfer::{
    CreateTransferData, TransferDirection, TransferRequest, TransferStatus,
};
use crate::services::transfers;

#[derive(Debug, Deserialize)]
struct ListTransfersQuery {
    branch_id: Uuid,
    direction: Option<TransferDirection>,
    status: Option<TransferStatus>,
}

async fn list_transfers(
    State(state): State<AppState>,
    Query(query): Query<ListTransfersQuery>,
) -> Result<Json<Vec<TransferRequest>>> {
    let requests = TransferRequest::list_for_branch(
        &state.pool,
        query.branch_id,
        query.direction.unwrap_or(TransferDirection::All),
        query.status,
    )
    .await?;

    Ok(Json(requests))
}

#[derive(Debug, Deserialize)]
struct CreateTransferBody {
    member_id: Uuid,
    from_branch_id: Uuid,
    to_branch_id: Uuid,
    reason: Option<String>,
    #[serde(default)]
    transfer_data: Vec<String>,
}

async fn create_transfer(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CreateTransferBody>,
) -> Result<Json<TransferRequest>> {
    let staff = get_authenticated_staff(&session)
        .await
        .map_err(|_| AppError::Unauthorized)?;

    let request = transfers::create_transfer(
        &state.pool,
        CreateTransferData {
            member_id: body.member_id,
            from_branch_id: body.from_branch_id,
            to_branch_id: body.to_branch_id,
            reason: body.reason,
            transfer_data: body.transfer_data,
            requested_by: Some(staff.staff_id),
        },
    )
    .await?;

    Ok(Json(request))
}

#[derive(Debug, Deserialize)]
struct DecisionBody {
    decision: TransferStatus,
}

async fn decide_transfer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: Session,
    Json(body): Json<DecisionBody>,
) -> Result<Json<TransferRequest>> {
    let staff = get_authenticated_staff(&session)
        .await
        .map_err(|_| AppError::Unauthorized)?;

    let request =
        transfers::decide_transfer(&state.pool, id, body.decision, Some(staff.staff_id)).await?;

    Ok(Json(request))
}

async fn complete_transfer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransferRequest>> {
    let request = transfers::complete_transfer(&state.pool, id).await?;

    Ok(Json(request))
}

async fn remove_transfer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    transfers::remove_transfer(&state.pool, id).await?;

    Ok(Json(serde_json::json!({ "removed": true })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/transfers", get(list_transfers).post(create_transfer))
        .route("/transfers/:id", delete(remove_transfer))
        .route("/transfers/:id/decision", post(decide_transfer))
        .route("/transfers/:id/complete", post(complete_transfer))
}
