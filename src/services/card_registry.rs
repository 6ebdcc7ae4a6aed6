use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{
    card::{CardStatus, CardType, CreateCardData, MemberCard},
    member::Member,
};

/// Issues a new active card to a member.
///
/// The card number must not be carried by any other active card. If the
/// member already holds an active card it is deactivated and the member's
/// card pointer moves to the new card.
#[tracing::instrument(skip(pool, card_number), fields(member_id = %member_id))]
pub async fn register_card(
    pool: &PgPool,
    member_id: Uuid,
    card_number: &str,
    card_type: CardType,
) -> Result<MemberCard> {
    let card_number = card_number.trim();
    if card_number.is_empty() {
        return Err(AppError::Validation("Card number is required".to_string()));
    }

    let member = Member::find_by_id(pool, member_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    if MemberCard::find_active_by_number(pool, card_number)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Card number is already in use by an active card".to_string(),
        ));
    }

    if let Some(previous) = MemberCard::find_active_by_member(pool, member.id).await? {
        MemberCard::set_status(pool, previous.id, CardStatus::Inactive).await?;
        tracing::info!(card_id = %previous.id, "Deactivated member's previous card");
    }

    let card = MemberCard::create(
        pool,
        CreateCardData {
            member_id: member.id,
            card_number: card_number.to_string(),
            card_type,
        },
    )
    .await?;

    Member::set_card(pool, member.id, card.id).await?;

    tracing::info!(card_id = %card.id, card_type = ?card.card_type, "Card registered");

    Ok(card)
}

/// Changes a card's status.
///
/// Marking a member's current card lost or inactive clears the member's
/// card pointer; re-activating a card re-checks the uniqueness rules and
/// restores the pointer.
#[tracing::instrument(skip(pool), fields(card_id = %card_id))]
pub async fn update_card_status(
    pool: &PgPool,
    card_id: Uuid,
    status: CardStatus,
) -> Result<MemberCard> {
    let card = MemberCard::find_by_id(pool, card_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Card not found".to_string()))?;

    if card.status == status {
        return Ok(card);
    }

    if status == CardStatus::Active {
        if let Some(other) = MemberCard::find_active_by_number(pool, &card.card_number).await? {
            if other.id != card.id {
                return Err(AppError::Conflict(
                    "Card number is already in use by an active card".to_string(),
                ));
            }
        }
        if let Some(other) = MemberCard::find_active_by_member(pool, card.member_id).await? {
            if other.id != card.id {
                return Err(AppError::Conflict(
                    "Member already holds an active card".to_string(),
                ));
            }
        }
    }

    MemberCard::set_status(pool, card.id, status).await?;

    let member = Member::find_by_id(pool, card.member_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    match status {
        CardStatus::Active => {
            Member::set_card(pool, member.id, card.id).await?;
        }
        CardStatus::Inactive | CardStatus::Lost => {
            // Only clear the pointer when this card is the member's current one
            if member.card_id == Some(card.id) {
                Member::clear_card(pool, member.id).await?;
            }
        }
    }

    tracing::info!(status = ?status, "Card status updated");

    MemberCard::find_by_id(pool, card.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Card not found".to_string()))
}
