use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{
    attendance::{AttendanceMethod, AttendanceRecord, AttendanceStatus, CreateRecordData},
    card::{CardStatus, MemberCard},
    event::AttendanceEvent,
    member::Member,
};

/// The window during which check-ins are accepted for an event:
/// `starts_at - early` through `ends_at + late`, boundaries inclusive.
pub fn check_in_window(
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    early_minutes: i32,
    late_minutes: i32,
) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        starts_at - Duration::minutes(early_minutes as i64),
        ends_at + Duration::minutes(late_minutes as i64),
    )
}

fn ensure_within_window(event: &AttendanceEvent, at: DateTime<Utc>) -> Result<()> {
    let (opens, closes) = check_in_window(
        event.starts_at,
        event.ends_at,
        event.early_check_in_minutes,
        event.late_check_in_minutes,
    );

    if at < opens {
        return Err(AppError::Validation(
            "Check-in has not opened for this event".to_string(),
        ));
    }
    if at > closes {
        return Err(AppError::Validation(
            "Check-in window has closed for this event".to_string(),
        ));
    }

    Ok(())
}

pub struct RecordAttendanceRequest {
    pub event_id: Uuid,
    pub member_id: Uuid,
    pub method: AttendanceMethod,
    pub device_id: Option<Uuid>,
    pub recorded_by: Option<Uuid>,
}

/// Records attendance for a member at an event.
///
/// Fails NotFound when the member or event is absent, Conflict when the
/// member already has an open check-in for the event, and Validation when
/// the current time is outside the event's check-in window.
#[tracing::instrument(skip(pool, request), fields(event_id = %request.event_id, member_id = %request.member_id))]
pub async fn record_attendance(
    pool: &PgPool,
    request: RecordAttendanceRequest,
) -> Result<AttendanceRecord> {
    let event = AttendanceEvent::find_by_id(pool, request.event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    if !event.is_active {
        return Err(AppError::Validation("Event is not active".to_string()));
    }

    let member = Member::find_by_id(pool, request.member_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    let now = Utc::now();
    ensure_within_window(&event, now)?;

    if AttendanceRecord::find_checked_in(pool, event.id, member.id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Member is already checked in to this event".to_string(),
        ));
    }

    let record = AttendanceRecord::create(
        pool,
        CreateRecordData {
            event_id: event.id,
            member_id: member.id,
            member_name: member.full_name(),
            method: request.method,
            device_id: request.device_id,
            recorded_by: request.recorded_by,
            family_of: None,
        },
    )
    .await?;

    tracing::info!(record_id = %record.id, method = ?record.method, "Attendance recorded");

    Ok(record)
}

/// Records a card-scan check-in. Resolves the card by number, then applies
/// the scan side effects: the card's `last_used` and the member's
/// `last_attendance` are stamped.
#[tracing::instrument(skip(pool, card_number))]
pub async fn record_card_scan(
    pool: &PgPool,
    event_id: Uuid,
    card_number: &str,
    device_id: Option<Uuid>,
) -> Result<AttendanceRecord> {
    let card = MemberCard::find_by_number(pool, card_number)
        .await?
        .ok_or_else(|| AppError::NotFound("Card not found".to_string()))?;

    if card.status != CardStatus::Active {
        return Err(AppError::Conflict("Card is not active".to_string()));
    }

    let record = record_attendance(
        pool,
        RecordAttendanceRequest {
            event_id,
            member_id: card.member_id,
            method: AttendanceMethod::CardScan,
            device_id,
            recorded_by: None,
        },
    )
    .await?;

    MemberCard::touch_last_used(pool, card.id, record.recorded_at).await?;
    Member::touch_attendance(pool, card.member_id, record.recorded_at).await?;

    Ok(record)
}

/// Checks in a primary attendee plus their family members. Family members
/// already checked in are skipped rather than failing the whole household.
#[tracing::instrument(skip(pool, request, family_member_ids), fields(event_id = %request.event_id))]
pub async fn check_in_family(
    pool: &PgPool,
    request: RecordAttendanceRequest,
    family_member_ids: &[Uuid],
) -> Result<Vec<AttendanceRecord>> {
    let method = request.method;
    let device_id = request.device_id;
    let recorded_by = request.recorded_by;
    let event_id = request.event_id;

    let primary = record_attendance(pool, request).await?;
    let mut records = vec![primary.clone()];

    for member_id in family_member_ids {
        if *member_id == primary.member_id {
            continue;
        }

        if AttendanceRecord::find_checked_in(pool, event_id, *member_id)
            .await?
            .is_some()
        {
            tracing::debug!(member_id = %member_id, "Family member already checked in, skipping");
            continue;
        }

        let member = Member::find_by_id(pool, *member_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Family member not found".to_string()))?;

        let record = AttendanceRecord::create(
            pool,
            CreateRecordData {
                event_id,
                member_id: member.id,
                member_name: member.full_name(),
                method,
                device_id,
                recorded_by,
                family_of: Some(primary.id),
            },
        )
        .await?;

        records.push(record);
    }

    tracing::info!(count = records.len(), "Family check-in recorded");

    Ok(records)
}

/// Checks out an attendee. Conflict when the record is already closed.
pub async fn check_out(pool: &PgPool, record_id: Uuid) -> Result<AttendanceRecord> {
    let record = AttendanceRecord::find_by_id(pool, record_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Attendance record not found".to_string()))?;

    if record.status != AttendanceStatus::CheckedIn {
        return Err(AppError::Conflict(
            "Attendee is not currently checked in".to_string(),
        ));
    }

    let now = Utc::now();
    AttendanceRecord::mark_checked_out(pool, record.id, now).await?;

    AttendanceRecord::find_by_id(pool, record.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Attendance record not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_window_extends_both_sides() {
        let (opens, closes) = check_in_window(
            at("2025-06-08T09:00:00Z"),
            at("2025-06-08T10:30:00Z"),
            30,
            15,
        );

        assert_eq!(opens, at("2025-06-08T08:30:00Z"));
        assert_eq!(closes, at("2025-06-08T10:45:00Z"));
    }

    #[test]
    fn test_window_without_grace_minutes() {
        let starts = at("2025-06-08T09:00:00Z");
        let ends = at("2025-06-08T10:30:00Z");

        assert_eq!(check_in_window(starts, ends, 0, 0), (starts, ends));
    }

    fn event(starts: &str, ends: &str, early: i32, late: i32) -> AttendanceEvent {
        let now = Utc::now();
        AttendanceEvent {
            id: Uuid::new_v4(),
            branch_id: Uuid::new_v4(),
            name: "Sunday Service".to_string(),
            event_type: "service".to_string(),
            starts_at: at(starts),
            ends_at: at(ends),
            recurrence: crate::models::event::Recurrence::Weekly,
            early_check_in_minutes: early,
            late_check_in_minutes: late,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_window_boundaries_are_inclusive() {
        let e = event("2025-06-08T09:00:00Z", "2025-06-08T10:00:00Z", 10, 10);

        assert!(ensure_within_window(&e, at("2025-06-08T08:50:00Z")).is_ok());
        assert!(ensure_within_window(&e, at("2025-06-08T10:10:00Z")).is_ok());
    }

    #[test]
    fn test_outside_window_is_rejected() {
        let e = event("2025-06-08T09:00:00Z", "2025-06-08T10:00:00Z", 10, 10);

        assert!(matches!(
            ensure_within_window(&e, at("2025-06-08T08:49:59Z")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            ensure_within_window(&e, at("2025-06-08T10:10:01Z")),
            Err(AppError::Validation(_))
        ));
    }
}
