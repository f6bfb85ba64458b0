//! Payment callback reconciliation
//!
//! Applies a verified gateway callback to the matching order. The order is
//! located by local id or by stored external order id in the same statement
//! that writes it, so concurrent callbacks queue on the write lock. Writes are
//! unconditional (last processed callback wins) and fulfillment status is
//! never touched. Each applied callback is appended to the payment event log
//! in the same transaction as the order update.

use serde_json::Value;
use shared::models::PaymentStatus;
use sqlx::SqlitePool;

use crate::db::orders::{self, CallbackWrite};
use crate::db::payment_events::{self, NewPaymentEvent};
use crate::db::RepoResult;

/// Fields extracted from a callback body
#[derive(Debug, Clone, PartialEq)]
pub struct Callback {
    /// `order_id` as sent by the gateway (local id or external reference)
    pub reference: String,
    /// Lower-cased `payment_status`, else `transaction_status`, else `unpaid`
    pub gateway_status: String,
    pub status: PaymentStatus,
    pub pay_currency: String,
    pub payment_id: String,
    pub amount: Option<f64>,
    pub payload: Value,
}

/// What a callback did
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Applied {
        order_id: String,
        status: PaymentStatus,
    },
    /// No order matched the reference; nothing written
    Unmatched { reference: String },
    /// Body unusable after verification; nothing written
    Ignored(&'static str),
}

impl Callback {
    pub fn parse(body: &[u8]) -> Result<Self, &'static str> {
        let payload: Value = serde_json::from_slice(body).map_err(|_| "body is not JSON")?;
        if !payload.is_object() {
            return Err("body is not a JSON object");
        }

        let reference = scalar_string(&payload["order_id"]).ok_or("missing order_id")?;

        let gateway_status = non_empty_str(&payload["payment_status"])
            .or_else(|| non_empty_str(&payload["transaction_status"]))
            .unwrap_or("unpaid")
            .to_lowercase();
        let status = PaymentStatus::from_gateway(&gateway_status).unwrap_or_else(|| {
            tracing::warn!(
                gateway_status = %gateway_status,
                "Unknown gateway payment status, recording as processing"
            );
            PaymentStatus::Processing
        });

        let pay_currency = scalar_string(&payload["pay_currency"])
            .unwrap_or_default()
            .to_lowercase();
        let payment_id = scalar_string(&payload["payment_id"]).unwrap_or_default();
        let amount = match &payload["price_amount"] {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        };

        Ok(Self {
            reference,
            gateway_status,
            status,
            pay_currency,
            payment_id,
            amount,
            payload,
        })
    }
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

/// Strings and numbers as text; anything else (including "") is absent
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse and apply a verified callback body.
///
/// Only store failures are errors; every other path yields an [`Outcome`].
pub async fn reconcile(pool: &SqlitePool, body: &[u8], now: i64) -> RepoResult<Outcome> {
    let callback = match Callback::parse(body) {
        Ok(cb) => cb,
        Err(reason) => {
            tracing::warn!(reason, "Ignoring payment callback");
            return Ok(Outcome::Ignored(reason));
        }
    };
    apply(pool, &callback, now).await
}

/// Apply a parsed callback
pub async fn apply(pool: &SqlitePool, callback: &Callback, now: i64) -> RepoResult<Outcome> {
    let mut tx = pool.begin().await?;

    let write = CallbackWrite {
        status: callback.status,
        gateway_status: &callback.gateway_status,
        currency: &callback.pay_currency,
        tx_hash: &callback.payment_id,
        raw: &callback.payload,
    };
    let Some(order_id) = orders::apply_callback(&mut *tx, &callback.reference, &write, now).await?
    else {
        tracing::info!(
            reference = %callback.reference,
            gateway_status = %callback.gateway_status,
            "Payment callback matched no order"
        );
        return Ok(Outcome::Unmatched {
            reference: callback.reference.clone(),
        });
    };

    payment_events::append(
        &mut *tx,
        &NewPaymentEvent {
            order_id: &order_id,
            external_order_id: &callback.reference,
            payment_id: &callback.payment_id,
            status: callback.status,
            gateway_status: &callback.gateway_status,
            pay_currency: &callback.pay_currency,
            amount: callback.amount,
            payload: &callback.payload,
            received_at: now,
        },
    )
    .await?;

    tx.commit().await?;

    if callback.status.is_settled() {
        tracing::info!(
            order_id = %order_id,
            status = callback.status.as_db(),
            "Payment settled; fulfillment status left for admin"
        );
    } else {
        tracing::info!(
            order_id = %order_id,
            status = callback.status.as_db(),
            "Payment status updated"
        );
    }

    Ok(Outcome::Applied {
        order_id,
        status: callback.status,
    })
}
