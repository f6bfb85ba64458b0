//! NOWPayments IPN handler
//!
//! Must receive the raw body (not JSON) for HMAC verification. Responses are
//! plain text: `ok`, `invalid signature` or `error`.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::nowpayments;
use crate::reconcile::{self, Outcome};
use crate::state::AppState;
use crate::util::now_millis;

const SIGNATURE_HEADER: &str = "x-nowpayments-sig";

/// POST /api/pay/crypto/webhook
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    if let Err(e) = nowpayments::verify_signature(&body, signature, state.ipn_secret.as_deref()) {
        tracing::warn!(error = e, "Webhook signature verification failed");
        return (StatusCode::BAD_REQUEST, "invalid signature");
    }

    match reconcile::reconcile(&state.pool, &body, now_millis()).await {
        Ok(Outcome::Applied { order_id, status }) => {
            tracing::debug!(order_id = %order_id, status = status.as_db(), "Webhook applied");
            (StatusCode::OK, "ok")
        }
        // Acknowledged so the gateway stops retrying
        Ok(Outcome::Unmatched { .. } | Outcome::Ignored(_)) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::error!(error = %e, "Webhook reconciliation failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "error")
        }
    }
}
