use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{
    branch::Branch,
    member::Member,
    transfer::{CreateTransferData, TransferRequest, TransferStatus},
};

/// Record categories that can travel with a transferred member.
pub const TRANSFER_DATA_KINDS: [&str; 4] =
    ["personal", "sacraments", "ministries", "donation_history"];

/// The transfer workflow admits exactly three transitions:
/// pending -> approved, pending -> rejected, approved -> completed.
pub fn transition_allowed(from: TransferStatus, to: TransferStatus) -> bool {
    matches!(
        (from, to),
        (TransferStatus::Pending, TransferStatus::Approved)
            | (TransferStatus::Pending, TransferStatus::Rejected)
            | (TransferStatus::Approved, TransferStatus::Completed)
    )
}

fn validate_transfer_data(transfer_data: &[String]) -> Result<()> {
    for item in transfer_data {
        if !TRANSFER_DATA_KINDS.contains(&item.as_str()) {
            return Err(AppError::Validation(format!(
                "Unknown transfer data category: {}",
                item
            )));
        }
    }

    Ok(())
}

/// Creates a pending transfer request for a member.
#[tracing::instrument(skip(pool, data), fields(member_id = %data.member_id))]
pub async fn create_transfer(pool: &PgPool, data: CreateTransferData) -> Result<TransferRequest> {
    if data.from_branch_id == data.to_branch_id {
        return Err(AppError::Validation(
            "Source and destination branches must differ".to_string(),
        ));
    }

    validate_transfer_data(&data.transfer_data)?;

    let member = Member::find_by_id(pool, data.member_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    if member.branch_id != data.from_branch_id {
        return Err(AppError::Validation(
            "Member does not belong to the source branch".to_string(),
        ));
    }

    Branch::find_by_id(pool, data.to_branch_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Destination branch not found".to_string()))?;

    let request = TransferRequest::create(pool, data).await?;

    tracing::info!(transfer_id = %request.id, "Transfer request created");

    Ok(request)
}

/// Approves or rejects a pending transfer request.
#[tracing::instrument(skip(pool), fields(transfer_id = %id))]
pub async fn decide_transfer(
    pool: &PgPool,
    id: Uuid,
    decision: TransferStatus,
    decided_by: Option<Uuid>,
) -> Result<TransferRequest> {
    if !matches!(decision, TransferStatus::Approved | TransferStatus::Rejected) {
        return Err(AppError::Validation(
            "Decision must be approved or rejected".to_string(),
        ));
    }

    let request = TransferRequest::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Transfer request not found".to_string()))?;

    if !transition_allowed(request.status, decision) {
        return Err(AppError::Conflict(format!(
            "Cannot move transfer from {:?} to {:?}",
            request.status, decision
        )));
    }

    TransferRequest::set_decision(pool, id, decision, decided_by).await?;

    tracing::info!(decision = ?decision, "Transfer request decided");

    TransferRequest::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Transfer request not found".to_string()))
}

/// Completes an approved transfer: the member moves to the destination
/// branch and the request is closed, atomically.
#[tracing::instrument(skip(pool), fields(transfer_id = %id))]
pub async fn complete_transfer(pool: &PgPool, id: Uuid) -> Result<TransferRequest> {
    let request = TransferRequest::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Transfer request not found".to_string()))?;

    if !transition_allowed(request.status, TransferStatus::Completed) {
        return Err(AppError::Conflict(format!(
            "Cannot complete a transfer in state {:?}",
            request.status
        )));
    }

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        UPDATE members
        SET branch_id = $2, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(request.member_id)
    .bind(request.to_branch_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        UPDATE transfer_requests
        SET status = 'completed', completed_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(request.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        member_id = %request.member_id,
        to_branch_id = %request.to_branch_id,
        "Transfer completed, member moved"
    );

    TransferRequest::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Transfer request not found".to_string()))
}

/// Removes a transfer request. Only pending requests can be removed;
/// decided requests are history.
pub async fn remove_transfer(pool: &PgPool, id: Uuid) -> Result<()> {
    let request = TransferRequest::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Transfer request not found".to_string()))?;

    if request.status != TransferStatus::Pending {
        return Err(AppError::Conflict(
            "Only pending transfer requests can be removed".to_string(),
        ));
    }

    TransferRequest::delete(pool, id).await?;

    tracing::info!(transfer_id = %id, "Transfer request removed");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_transitions() {
        assert!(transition_allowed(
            TransferStatus::Pending,
            TransferStatus::Approved
        ));
        assert!(transition_allowed(
            TransferStatus::Pending,
            TransferStatus::Rejected
        ));
        assert!(transition_allowed(
            TransferStatus::Approved,
            TransferStatus::Completed
        ));
    }

    #[test]
    fn test_rejected_is_terminal() {
        for to in [
            TransferStatus::Pending,
            TransferStatus::Approved,
            TransferStatus::Completed,
        ] {
            assert!(!transition_allowed(TransferStatus::Rejected, to));
        }
    }

    #[test]
    fn test_completed_is_terminal() {
        for to in [
            TransferStatus::Pending,
            TransferStatus::Approved,
            TransferStatus::Rejected,
        ] {
            assert!(!transition_allowed(TransferStatus::Completed, to));
        }
    }

    #[test]
    fn test_pending_cannot_skip_to_completed() {
        assert!(!transition_allowed(
            TransferStatus::Pending,
            TransferStatus::Completed
        ));
    }

    #[test]
    fn test_transfer_data_validation() {
        let valid: Vec<String> = vec!["personal".into(), "donation_history".into()];
        assert!(validate_transfer_data(&valid).is_ok());

        let invalid: Vec<String> = vec!["personal".into(), "pets".into()];
        assert!(matches!(
            validate_transfer_data(&invalid),
            Err(AppError::Validation(_))
        ));
    }
}
