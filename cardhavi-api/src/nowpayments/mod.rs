//! NOWPayments integration via REST API (no SDK dependency)
//!
//! - [`PaymentGateway`]: invoice creation seam (real client or a test double)
//! - [`verify_signature`]: IPN callback authentication (HMAC-SHA512 over the raw body)

use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use sha2::Sha512;
use thiserror::Error;

/// Invoice request body sent to `POST /v1/invoice`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoicePayload {
    pub price_amount: f64,
    pub price_currency: String,
    pub order_id: String,
    pub success_url: String,
    pub cancel_url: String,
    pub ipn_callback_url: String,
    pub is_fixed_rate: bool,
    pub supported_multi_payments: String,
    pub order_description: String,
    pub metadata: Value,
}

/// Hosted invoice issued by the gateway
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayInvoice {
    pub id: String,
    pub invoice_url: String,
    /// Full response body
    pub raw: Value,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("payment gateway API key is not configured")]
    NotConfigured,

    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("gateway response is missing {0}")]
    InvalidResponse(&'static str),
}

/// Outbound invoice creation
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_invoice(&self, payload: &InvoicePayload) -> Result<GatewayInvoice, GatewayError>;
}

/// Static parts of every invoice request
#[derive(Debug, Clone)]
pub struct InvoiceSettings {
    /// Storefront base URL for success/cancel redirects
    pub public_base_url: String,
    /// Public API base URL for the IPN callback
    pub public_api_url: String,
    /// Comma separated pay currencies offered on the hosted page
    pub pay_currencies: String,
}

impl InvoiceSettings {
    /// Build the gateway payload for a validated amount.
    ///
    /// `amount` is rounded to cents and `currency` lower-cased.
    pub fn payload(&self, amount: f64, currency: &str, order_id: &str, meta: Value) -> InvoicePayload {
        let base = self.public_base_url.trim_end_matches('/');
        let api = self.public_api_url.trim_end_matches('/');
        InvoicePayload {
            price_amount: shared::util::round_money(amount),
            price_currency: currency.to_lowercase(),
            order_id: order_id.to_string(),
            success_url: format!("{base}/payment/success?order_id={order_id}"),
            cancel_url: format!("{base}/payment/cancel?order_id={order_id}"),
            ipn_callback_url: format!("{api}/api/pay/crypto/webhook"),
            // Customer picks the coin on the hosted page
            is_fixed_rate: false,
            supported_multi_payments: self.pay_currencies.clone(),
            order_description: "Marketplace order".to_string(),
            metadata: meta,
        }
    }
}

/// NOWPayments HTTP client
pub struct NowPaymentsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl NowPaymentsClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl PaymentGateway for NowPaymentsClient {
    async fn create_invoice(&self, payload: &InvoicePayload) -> Result<GatewayInvoice, GatewayError> {
        let api_key = self.api_key.as_deref().ok_or(GatewayError::NotConfigured)?;

        let response = self
            .client
            .post(format!("{}/v1/invoice", self.base_url))
            .header("x-api-key", api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let raw: Value = if body.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(&body).map_err(|_| GatewayError::InvalidResponse("JSON body"))?
        };
        parse_invoice(raw)
    }
}

/// Extract id and hosted URL; the gateway may send the id as a string or a number
fn parse_invoice(raw: Value) -> Result<GatewayInvoice, GatewayError> {
    let id = match &raw["id"] {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return Err(GatewayError::InvalidResponse("id")),
    };
    let invoice_url = raw["invoice_url"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(String::from)
        .ok_or(GatewayError::InvalidResponse("invoice_url"))?;
    Ok(GatewayInvoice {
        id,
        invoice_url,
        raw,
    })
}

/// Lower-case hex HMAC-SHA512 of `payload`
pub fn sign(payload: &[u8], secret: &str) -> Result<String, &'static str> {
    let mut mac = Hmac::<Sha512>::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify an `x-nowpayments-sig` header against the exact raw body.
///
/// The signature must be the lower-case hex digest; anything else is a mismatch.
pub fn verify_signature(
    payload: &[u8],
    signature: Option<&str>,
    secret: Option<&str>,
) -> Result<(), &'static str> {
    let secret = secret.filter(|s| !s.is_empty()).ok_or("IPN secret not configured")?;
    let signature = signature
        .filter(|s| !s.is_empty())
        .ok_or("Missing x-nowpayments-sig header")?;

    if !signature
        .bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return Err("Webhook signature mismatch");
    }
    let sig_bytes = hex::decode(signature).map_err(|_| "Webhook signature mismatch")?;

    let mut mac = Hmac::<Sha512>::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(payload);
    // Constant-time comparison via hmac::verify_slice
    mac.verify_slice(&sig_bytes)
        .map_err(|_| "Webhook signature mismatch")
}
