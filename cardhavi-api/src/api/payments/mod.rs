//! Crypto payment API
//!
//! - `POST /api/pay/crypto/create-invoice`: hosted invoice for a checkout
//! - `POST /api/pay/crypto/webhook`: gateway IPN callback (raw body, signature verified)

mod invoice;
mod webhook;

use axum::Router;
use axum::routing::post;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/pay/crypto/create-invoice", post(invoice::create_invoice))
        .route("/api/pay/crypto/webhook", post(webhook::handle_webhook))
}
