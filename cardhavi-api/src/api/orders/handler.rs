//! Order API Handlers

use axum::Json;
use axum::extract::{Path, State};
use http::StatusCode;
use shared::error::{AppError, ErrorCode};
use shared::models::{FulfillmentStatus, Order, OrderCreate, OrderUser, Payment, PaymentEvent, StatusUpdate};
use shared::util::{items_total, money_eq};

use crate::api::extract::ApiJson;
use crate::db::{orders, payment_events};
use crate::error::ServiceResult;
use crate::state::AppState;
use crate::util::{new_id, now_millis};

fn validate_user(user: Option<OrderUser>) -> Result<OrderUser, AppError> {
    let user = user.ok_or_else(|| AppError::required("user"))?;
    if user.id.trim().is_empty() {
        return Err(AppError::validation("user.id must not be empty").with_detail("field", "user.id"));
    }
    Ok(user)
}

/// POST /api/orders
///
/// The client total is stored as given.
pub async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<OrderCreate>,
) -> ServiceResult<(StatusCode, Json<Order>)> {
    let user = validate_user(payload.user)?;
    let items = payload.items.unwrap_or_default();
    if items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty).into());
    }
    let total = payload
        .total
        .filter(|t| t.is_finite())
        .ok_or_else(|| AppError::validation("total must be a number").with_detail("field", "total"))?;

    match items_total(&items) {
        Some(computed) if !money_eq(computed, total) => {
            tracing::debug!(total, computed, "Order total differs from line items");
        }
        Some(_) => {}
        None => tracing::debug!(total, "Line item total out of range, not compared"),
    }

    let now = now_millis();
    let order = Order {
        id: new_id(),
        user,
        items,
        total,
        address: payload.address.unwrap_or_default(),
        status: FulfillmentStatus::Pending,
        payment: Payment::default(),
        created_at: now,
        updated_at: now,
    };
    orders::insert(&state.pool, &order).await?;

    tracing::info!(order_id = %order.id, user_id = %order.user.id, total, "Order created");
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders
pub async fn list(State(state): State<AppState>) -> ServiceResult<Json<Vec<Order>>> {
    Ok(Json(orders::find_all(&state.pool).await?))
}

/// GET /api/orders/user/{user_id}
pub async fn list_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ServiceResult<Json<Vec<Order>>> {
    Ok(Json(orders::find_by_user(&state.pool, &user_id).await?))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServiceResult<Json<Order>> {
    let order = orders::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    Ok(Json(order))
}

/// PATCH /api/orders/{id}/status - overwrite fulfillment status, any value to any value
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<StatusUpdate>,
) -> ServiceResult<Json<Order>> {
    let raw = payload.status.ok_or_else(|| AppError::required("status"))?;
    let status = FulfillmentStatus::from_db(&raw).ok_or_else(|| {
        AppError::new(ErrorCode::OrderInvalidStatus).with_detail("status", raw.clone())
    })?;

    let order = orders::update_status(&state.pool, &id, status, now_millis())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    tracing::info!(order_id = %id, status = status.as_db(), "Order status updated");
    Ok(Json(order))
}

/// GET /api/orders/{id}/payment-events
pub async fn payment_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServiceResult<Json<Vec<PaymentEvent>>> {
    if orders::find_by_id(&state.pool, &id).await?.is_none() {
        return Err(AppError::new(ErrorCode::OrderNotFound).into());
    }
    Ok(Json(payment_events::find_by_order(&state.pool, &id).await?))
}
