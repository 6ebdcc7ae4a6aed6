use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::middleware::session::AppState;
use crate::error::{AppError, Result};
use crate::models::card::{CardStatus, CardType, MemberCard};
use crate::services::{card_registry, card_token, qr};

#[derive(Debug, Deserialize)]
struct ListCardsQuery {
    member_id: Uuid,
}

async fn list_cards(
    State(state): State<AppState>,
    Query(query): Query<ListCardsQuery>,
) -> Result<Json<Vec<MemberCard>>> {
    let cards = MemberCard::list_by_member(&state.pool, query.member_id).await?;

    Ok(Json(cards))
}

#[derive(Debug, Deserialize)]
struct RegisterCardBody {
    member_id: Uuid,
    card_number: String,
    card_type: CardType,
}

async fn register_card(
    State(state): State<AppState>,
    Json(body): Json<RegisterCardBody>,
) -> Result<Json<MemberCard>> {
    let card = card_registry::register_card(
        &state.pool,
        body.member_id,
        &body.card_number,
        body.card_type,
    )
    .await?;

    Ok(Json(card))
}

#[derive(Debug, Deserialize)]
struct UpdateCardStatusBody {
    status: CardStatus,
}

async fn update_card_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCardStatusBody>,
) -> Result<Json<MemberCard>> {
    let card = card_registry::update_card_status(&state.pool, id, body.status).await?;

    Ok(Json(card))
}

#[derive(Debug, Deserialize)]
struct CardQrQuery {
    format: Option<String>,
}

/// Renders the card's signed QR payload. RFID/NFC cards carry a physical
/// number instead, so only QR cards have a code to render.
async fn card_qr(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<CardQrQuery>,
) -> Result<Response> {
    let card = MemberCard::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Card not found".to_string()))?;

    if card.status != CardStatus::Active {
        return Err(AppError::Conflict("Card is not active".to_string()));
    }

    let key = card_token::derive_key(state.config.card_signing_secret.expose_secret());
    let payload = card_token::CardTokenPayload {
        card_id: card.id,
        member_id: card.member_id,
        card_number: card.card_number.clone(),
        issued_at: card.issued_at,
    };
    let token = card_token::encode(&payload, &key)
        .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;

    match query.format.as_deref().unwrap_or("svg") {
        "png" => {
            let png = qr::render_png(&token)
                .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;

            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, "image/png")],
                png,
            )
                .into_response())
        }
        "svg" => {
            let svg = qr::render_svg(&token)
                .map_err(|e| AppError::Internal(anyhow::Error::new(e)))?;

            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, "image/svg+xml")],
                svg,
            )
                .into_response())
        }
        other => Err(AppError::Validation(format!(
            "Unknown QR format: {}",
            other
        ))),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cards", get(list_cards).post(register_card))
        .route("/cards/:id/status", post(update_card_status))
        .route("/cards/:id/qr", get(card_qr))
}
