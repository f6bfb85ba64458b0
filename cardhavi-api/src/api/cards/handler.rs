//! Card API Handlers

use axum::Json;
use axum::extract::{Path, State};
use http::StatusCode;
use shared::error::{AppError, ErrorCode};
use shared::models::{Card, CardCreate, CardUpdate, DeleteResponse, Rarity};

use crate::api::extract::ApiJson;
use crate::db::cards;
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::util::{new_id, now_millis};

fn parse_rarity(value: &str) -> Result<Rarity, AppError> {
    Rarity::from_db(value).ok_or_else(|| {
        AppError::new(ErrorCode::CardInvalidRarity).with_detail("rarity", value.to_string())
    })
}

fn check_price(price: f64) -> Result<f64, AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::new(ErrorCode::CardInvalidPrice).with_detail("price", price));
    }
    Ok(price)
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::required(field))
}

/// GET /api/cards - list cards, seeding the default catalog on first use
pub async fn list(State(state): State<AppState>) -> ServiceResult<Json<Vec<Card>>> {
    cards::seed_if_empty(&state.pool, now_millis()).await?;
    let cards = cards::find_all(&state.pool).await?;
    Ok(Json(cards))
}

/// POST /api/cards
pub async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CardCreate>,
) -> ServiceResult<(StatusCode, Json<Card>)> {
    let name = required(&payload.name, "name")?;
    let category = required(&payload.category, "category")?;
    let price = payload
        .price
        .ok_or_else(|| AppError::required("price"))
        .and_then(check_price)?;
    let rarity = parse_rarity(required(&payload.rarity, "rarity")?)?;

    let stock = payload.stock.unwrap_or(0);
    let now = now_millis();
    let card = Card {
        id: new_id(),
        name: name.to_string(),
        category: category.to_string(),
        price,
        rarity,
        rating: payload.rating.unwrap_or(0.0),
        in_stock: payload.in_stock.unwrap_or(stock > 0),
        stock,
        description: payload.description,
        image_url: payload.image_url,
        promo_active: payload.promo_active.unwrap_or(false),
        promo_buy_qty: payload.promo_buy_qty.unwrap_or(0),
        promo_get_qty: payload.promo_get_qty.unwrap_or(0),
        promo_get_amount: payload.promo_get_amount.unwrap_or(0.0),
        created_at: now,
        updated_at: now,
    };
    cards::insert(&state.pool, &card).await?;

    tracing::info!(card_id = %card.id, name = %card.name, "Card created");
    Ok((StatusCode::CREATED, Json(card)))
}

/// PUT /api/cards/{id} - partial update
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<CardUpdate>,
) -> ServiceResult<Json<Card>> {
    let rarity = payload.rarity.as_deref().map(parse_rarity).transpose()?;
    if let Some(price) = payload.price {
        check_price(price)?;
    }

    let card = cards::update(&state.pool, &id, &payload, rarity, now_millis())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::CardNotFound))?;
    Ok(Json(card))
}

/// DELETE /api/cards/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServiceResult<Json<DeleteResponse>> {
    if !cards::delete(&state.pool, &id).await? {
        return Err(AppError::new(ErrorCode::CardNotFound).into());
    }
    tracing::info!(card_id = %id, "Card deleted");
    Ok(Json(DeleteResponse { success: true }))
}
