use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::middleware::session::AppState;
use crate::error::{AppError, Result};
use crate::models::member::{CreateMemberData, Member, MemberListFilter, UpdateMemberData};

const DEFAULT_PAGE_SIZE: i64 = 25;
const MAX_PAGE_SIZE: i64 = 200;

#[derive(Debug, Deserialize)]
struct ListMembersQuery {
    branch_id: Option<Uuid>,
    search: Option<String>,
    page: Option<i64>,
    per_page: Option<i64>,
}

async fn list_members(
    State(state): State<AppState>,
    Query(query): Query<ListMembersQuery>,
) -> Result<Json<Vec<Member>>> {
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let page = query.page.unwrap_or(1).max(1);

    let members = Member::list(
        &state.pool,
        MemberListFilter {
            branch_id: query.branch_id,
            search: query.search.filter(|s| !s.trim().is_empty()),
            limit: per_page,
            offset: (page - 1) * per_page,
        },
    )
    .await?;

    Ok(Json(members))
}

async fn create_member(
    State(state): State<AppState>,
    Json(data): Json<CreateMemberData>,
) -> Result<Json<Member>> {
    if data.first_name.trim().is_empty() || data.last_name.trim().is_empty() {
        return Err(AppError::Validation(
            "First and last name are required".to_string(),
        ));
    }

    let member = Member::create(&state.pool, data).await?;

    tracing::info!(member_id = %member.id, "Member created");

    Ok(Json(member))
}

async fn get_member(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Member>> {
    let member = Member::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    Ok(Json(member))
}

async fn update_member(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateMemberData>,
) -> Result<Json<Member>> {
    Member::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    Member::update(&state.pool, id, data).await?;

    let member = Member::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    tracing::info!(member_id = %member.id, "Member updated");

    Ok(Json(member))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/members", get(list_members).post(create_member))
        .route("/members/:id", get(get_member).patch(update_member))
}
