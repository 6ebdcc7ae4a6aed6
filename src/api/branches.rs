use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::middleware::session::AppState;
use crate::error::{AppError, Result};
use crate::models::branch::{Branch, CreateBranchData, UpdateBranchData};

#[derive(Debug, Deserialize)]
struct ListBranchesQuery {
    #[serde(default)]
    include_inactive: bool,
}

async fn list_branches(
    State(state): State<AppState>,
    Query(query): Query<ListBranchesQuery>,
) -> Result<Json<Vec<Branch>>> {
    let branches = Branch::list(&state.pool, !query.include_inactive).await?;

    Ok(Json(branches))
}

async fn create_branch(
    State(state): State<AppState>,
    Json(data): Json<CreateBranchData>,
) -> Result<Json<Branch>> {
    if data.name.trim().is_empty() {
        return Err(AppError::Validation("Branch name is required".to_string()));
    }

    let branch = Branch::create(&state.pool, data).await?;

    tracing::info!(branch_id = %branch.id, "Branch created");

    Ok(Json(branch))
}

async fn get_branch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Branch>> {
    let branch = Branch::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Branch not found".to_string()))?;

    Ok(Json(branch))
}

async fn update_branch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateBranchData>,
) -> Result<Json<Branch>> {
    Branch::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Branch not found".to_string()))?;

    Branch::update(&state.pool, id, data).await?;

    let branch = Branch::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Branch not found".to_string()))?;

    tracing::info!(branch_id = %branch.id, "Branch updated");

    Ok(Json(branch))
}

async fn deactivate_branch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    Branch::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Branch not found".to_string()))?;

    Branch::deactivate(&state.pool, id).await?;

    tracing::info!(branch_id = %id, "Branch deactivated");

    Ok(Json(serde_json::json!({ "deactivated": true })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/branches", get(list_branches).post(create_branch))
        .route("/branches/:id", get(get_branch).patch(update_branch))
        .route("/branches/:id/deactivate", post(deactivate_branch))
}
