use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

use crate::api::middleware::{auth::get_authenticated_staff, session::AppState};
use crate::error::{AppError, Result};
use crate::models::attendance::{
    AttendanceMethod, AttendanceRecord, AttendanceStatus, RecordListFilter,
};
use crate::services::analytics::{self, AttendanceSummary};
use crate::services::check_in::{self, RecordAttendanceRequest};
use crate::services::periods::Timeframe;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 500;

#[derive(Debug, Deserialize)]
struct ListRecordsQuery {
    event_id: Option<Uuid>,
    member_id: Option<Uuid>,
    status: Option<AttendanceStatus>,
    page: Option<i64>,
    per_page: Option<i64>,
}

async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<ListRecordsQuery>,
) -> Result<Json<Vec<AttendanceRecord>>> {
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let page = query.page.unwrap_or(1).max(1);

    let records = AttendanceRecord::list(
        &state.pool,
        RecordListFilter {
            event_id: query.event_id,
            member_id: query.member_id,
            status: query.status,
            limit: per_page,
            offset: (page - 1) * per_page,
        },
    )
    .await?;

    Ok(Json(records))
}

#[derive(Debug, Deserialize)]
struct RecordAttendanceBody {
    event_id: Uuid,
    member_id: Uuid,
    method: AttendanceMethod,
}

async fn record_attendance(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RecordAttendanceBody>,
) -> Result<Json<AttendanceRecord>> {
    let staff = get_authenticated_staff(&session)
        .await
        .map_err(|_| AppError::Unauthorized)?;

    let record = check_in::record_attendance(
        &state.pool,
        RecordAttendanceRequest {
            event_id: body.event_id,
            member_id: body.member_id,
            method: body.method,
            device_id: None,
            recorded_by: Some(staff.staff_id),
        },
    )
    .await?;

    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
struct FamilyCheckInBody {
    event_id: Uuid,
    member_id: Uuid,
    method: AttendanceMethod,
    family_member_ids: Vec<Uuid>,
}

async fn check_in_family(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<FamilyCheckInBody>,
) -> Result<Json<Vec<AttendanceRecord>>> {
    let staff = get_authenticated_staff(&session)
        .await
        .map_err(|_| AppError::Unauthorized)?;

    let records = check_in::check_in_family(
        &state.pool,
        RecordAttendanceRequest {
            event_id: body.event_id,
            member_id: body.member_id,
            method: body.method,
            device_id: None,
            recorded_by: Some(staff.staff_id),
        },
        &body.family_member_ids,
    )
    .await?;

    Ok(Json(records))
}

async fn check_out(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AttendanceRecord>> {
    let record = check_in::check_out(&state.pool, id).await?;

    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
struct AnalyticsQuery {
    branch_id: Uuid,
    timeframe: Timeframe,
}

async fn attendance_analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<AttendanceSummary>> {
    let summary =
        analytics::attendance_summary(&state.pool, query.branch_id, query.timeframe, Utc::now())
            .await?;

    Ok(Json(summary))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/attendance", get(list_records).post(record_attendance))
        .route("/attendance/family", post(check_in_family))
        .route("/attendance/:id/check-out", post(check_out))
        .route("/analytics/attendance", get(attendance_analytics))
}
