use std::collections::HashSet;

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{
    attendance::{AttendanceMethod, AttendanceRecord, CreateRecordData},
    event::AttendanceEvent,
    member::Member,
};

/// Candidate members for a take-attendance page, split by whether they
/// already have a record for the event.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RollCallSheet {
    pub available: Vec<Member>,
    pub already_marked: Vec<Member>,
}

/// Outcome of planning a roll-call submission against existing records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionPlan {
    /// Members to insert records for (the net-new subset)
    Insert(Vec<Uuid>),
    /// Selection was empty
    NothingSelected,
    /// Every selected member already has a record
    AllAlreadyMarked,
}

/// Partitions a selection into the subset that still needs a record.
///
/// "Nothing selected" and "everyone already marked" are distinct outcomes:
/// the dashboard shows a different message for each.
pub fn plan_submission(marked: &HashSet<Uuid>, selected: &[Uuid]) -> SubmissionPlan {
    if selected.is_empty() {
        return SubmissionPlan::NothingSelected;
    }

    let mut seen = HashSet::new();
    let net_new: Vec<Uuid> = selected
        .iter()
        .copied()
        .filter(|id| !marked.contains(id) && seen.insert(*id))
        .collect();

    if net_new.is_empty() {
        SubmissionPlan::AllAlreadyMarked
    } else {
        SubmissionPlan::Insert(net_new)
    }
}

/// Builds the take-attendance sheet for an event: branch members split
/// into available and already-marked.
pub async fn build_sheet(pool: &PgPool, event_id: Uuid) -> Result<RollCallSheet> {
    let event = AttendanceEvent::find_by_id(pool, event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let records = AttendanceRecord::list_for_event(pool, event_id).await?;
    let marked: HashSet<Uuid> = records.iter().map(|r| r.member_id).collect();

    let members = Member::list(
        pool,
        crate::models::member::MemberListFilter {
            branch_id: Some(event.branch_id),
            search: None,
            limit: 10_000,
            offset: 0,
        },
    )
    .await?;

    let (already_marked, available) = members
        .into_iter()
        .partition(|m| marked.contains(&m.id));

    Ok(RollCallSheet {
        available,
        already_marked,
    })
}

/// Submits a roll-call selection, inserting manual-entry records for the
/// members that are not yet marked.
#[tracing::instrument(skip(pool, selected), fields(event_id = %event_id))]
pub async fn submit(
    pool: &PgPool,
    event_id: Uuid,
    selected: &[Uuid],
    recorded_by: Option<Uuid>,
) -> Result<Vec<AttendanceRecord>> {
    AttendanceEvent::find_by_id(pool, event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let records = AttendanceRecord::list_for_event(pool, event_id).await?;
    let marked: HashSet<Uuid> = records.iter().map(|r| r.member_id).collect();

    let to_insert = match plan_submission(&marked, selected) {
        SubmissionPlan::Insert(ids) => ids,
        SubmissionPlan::NothingSelected => {
            return Err(AppError::Validation(
                "No members selected for attendance".to_string(),
            ));
        }
        SubmissionPlan::AllAlreadyMarked => {
            return Err(AppError::Conflict(
                "All selected members are already marked".to_string(),
            ));
        }
    };

    let mut inserted = Vec::with_capacity(to_insert.len());
    for member_id in to_insert {
        let member = Member::find_by_id(pool, member_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

        let record = AttendanceRecord::create(
            pool,
            CreateRecordData {
                event_id,
                member_id,
                member_name: member.full_name(),
                method: AttendanceMethod::ManualEntry,
                device_id: None,
                recorded_by,
                family_of: None,
            },
        )
        .await?;

        inserted.push(record);
    }

    tracing::info!(count = inserted.len(), "Roll-call submission recorded");

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn test_empty_selection_is_distinguished() {
        let marked: HashSet<Uuid> = ids(3).into_iter().collect();

        assert_eq!(plan_submission(&marked, &[]), SubmissionPlan::NothingSelected);
    }

    #[test]
    fn test_fully_marked_selection_is_distinguished() {
        let members = ids(3);
        let marked: HashSet<Uuid> = members.iter().copied().collect();

        assert_eq!(
            plan_submission(&marked, &members),
            SubmissionPlan::AllAlreadyMarked
        );
    }

    #[test]
    fn test_only_unmarked_members_are_inserted() {
        let members = ids(4);
        let marked: HashSet<Uuid> = members[..2].iter().copied().collect();

        let plan = plan_submission(&marked, &members);

        assert_eq!(plan, SubmissionPlan::Insert(members[2..].to_vec()));
    }

    #[test]
    fn test_duplicate_selections_collapse() {
        let member = Uuid::new_v4();
        let marked = HashSet::new();

        let plan = plan_submission(&marked, &[member, member, member]);

        assert_eq!(plan, SubmissionPlan::Insert(vec![member]));
    }

    #[test]
    fn test_select_all_against_empty_sheet() {
        let members = ids(5);
        let marked = HashSet::new();

        assert_eq!(
            plan_submission(&marked, &members),
            SubmissionPlan::Insert(members)
        );
    }
}
