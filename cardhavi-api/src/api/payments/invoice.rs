//! Invoice creation handler

use axum::Json;
use axum::extract::State;
use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use shared::models::{InvoiceCreate, InvoiceResponse};
use shared::util::round_money;

use crate::api::extract::ApiJson;
use crate::db::orders::{self, InvoiceLink};
use crate::error::ServiceResult;
use crate::nowpayments::GatewayError;
use crate::state::AppState;
use crate::util::now_millis;

/// Amount must be a JSON number that stays positive after rounding to cents
fn validate_amount(amount: Option<&Value>) -> Result<f64, AppError> {
    match amount.and_then(Value::as_f64) {
        Some(a) if a.is_finite() && round_money(a) > 0.0 => Ok(a),
        _ => Err(AppError::new(ErrorCode::PaymentInvalidAmount)),
    }
}

/// POST /api/pay/crypto/create-invoice
pub async fn create_invoice(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<InvoiceCreate>,
) -> ServiceResult<Json<InvoiceResponse>> {
    let amount = validate_amount(req.amount.as_ref())?;
    let currency = req
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or("USD");
    let local_order_id = req.order_id.as_deref().map(str::trim).filter(|id| !id.is_empty());
    let reference = local_order_id
        .map(String::from)
        .unwrap_or_else(|| format!("inv_{}", now_millis()));
    let meta = req.meta.unwrap_or_else(|| Value::Object(Default::default()));

    let payload = state.invoice.payload(amount, currency, &reference, meta);
    let invoice = state.gateway.create_invoice(&payload).await.map_err(|e| match e {
        GatewayError::NotConfigured => {
            tracing::error!("Invoice requested but NOWPAYMENTS_API_KEY is not set");
            AppError::new(ErrorCode::PaymentGatewayNotConfigured)
        }
        other => {
            tracing::error!(order_id = %reference, error = %other, "Invoice creation failed");
            AppError::new(ErrorCode::InvoiceCreationFailed)
        }
    })?;

    // The gateway may echo its own order reference
    let external_order_id = invoice.raw["order_id"]
        .as_str()
        .filter(|s| !s.is_empty())
        .unwrap_or(&reference)
        .to_string();

    tracing::info!(
        invoice_id = %invoice.id,
        order_id = %external_order_id,
        amount = payload.price_amount,
        "Invoice created"
    );

    if let Some(order_id) = local_order_id {
        let link = InvoiceLink {
            invoice_id: &invoice.id,
            external_order_id: &external_order_id,
            raw: &invoice.raw,
        };
        // Best effort: the invoice exists whether or not the order records it
        match orders::attach_invoice(&state.pool, order_id, &link, now_millis()).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(order_id, invoice_id = %invoice.id, "Invoice issued for unknown order");
            }
            Err(e) => {
                tracing::warn!(order_id, error = %e, "Failed to record invoice on order");
            }
        }
    }

    Ok(Json(InvoiceResponse {
        invoice_id: invoice.id,
        invoice_url: invoice.invoice_url,
        order_id: external_order_id,
        raw: invoice.raw,
    }))
}
