use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

use crate::api::middleware::{auth::get_authenticated_staff, session::AppState};
use crate::error::{AppError, Result};
use crate::models::attendance::AttendanceRecord;
use crate::models::event::{AttendanceEvent, CreateEventData, UpdateEventData};
use crate::services::roll_call::{self, RollCallSheet};

#[derive(Debug, Deserialize)]
struct ListEventsQuery {
    branch_id: Uuid,
    #[serde(default)]
    include_inactive: bool,
}

async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<Vec<AttendanceEvent>>> {
    let events =
        AttendanceEvent::list_by_branch(&state.pool, query.branch_id, !query.include_inactive)
            .await?;

    Ok(Json(events))
}

async fn create_event(
    State(state): State<AppState>,
    Json(data): Json<CreateEventData>,
) -> Result<Json<AttendanceEvent>> {
    if data.name.trim().is_empty() {
        return Err(AppError::Validation("Event name is required".to_string()));
    }
    if data.ends_at <= data.starts_at {
        return Err(AppError::Validation(
            "Event must end after it starts".to_string(),
        ));
    }

    let event = AttendanceEvent::create(&state.pool, data).await?;

    tracing::info!(event_id = %event.id, "Event created");

    Ok(Json(event))
}

async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AttendanceEvent>> {
    let event = AttendanceEvent::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    Ok(Json(event))
}

async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateEventData>,
) -> Result<Json<AttendanceEvent>> {
    AttendanceEvent::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    AttendanceEvent::update(&state.pool, id, data).await?;

    let event = AttendanceEvent::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    tracing::info!(event_id = %event.id, "Event updated");

    Ok(Json(event))
}

async fn deactivate_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    AttendanceEvent::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    AttendanceEvent::deactivate(&state.pool, id).await?;

    Ok(Json(serde_json::json!({ "deactivated": true })))
}

/// The take-attendance sheet: branch members split into those still
/// available to mark and those already marked for this event.
async fn roll_call_sheet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RollCallSheet>> {
    let sheet = roll_call::build_sheet(&state.pool, id).await?;

    Ok(Json(sheet))
}

#[derive(Debug, Deserialize)]
struct RollCallSubmission {
    member_ids: Vec<Uuid>,
}

async fn submit_roll_call(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: Session,
    Json(submission): Json<RollCallSubmission>,
) -> Result<Json<Vec<AttendanceRecord>>> {
    let staff = get_authenticated_staff(&session)
        .await
        .map_err(|_| AppError::Unauthorized)?;

    let records =
        roll_call::submit(&state.pool, id, &submission.member_ids, Some(staff.staff_id)).await?;

    Ok(Json(records))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/:id", get(get_event).patch(update_event))
        .route("/events/:id/deactivate", post(deactivate_event))
        .route(
            "/events/:id/roll-call",
            get(roll_call_sheet).post(submit_roll_call),
        )
}
