//! Payment sub-record, invoice payloads and the payment event log

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How the customer pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery
    Cod,
    Card,
    #[default]
    Crypto,
}

impl PaymentMethod {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "cod" => Some(Self::Cod),
            "card" => Some(Self::Card),
            "crypto" => Some(Self::Crypto),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Cod => "cod",
            Self::Card => "card",
            Self::Crypto => "crypto",
        }
    }
}

/// Payment lifecycle: `unpaid -> processing -> {confirmed | finished | failed | expired}`
///
/// Independent of fulfillment status. Any state may be overwritten by a later
/// gateway callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Processing,
    Confirmed,
    Finished,
    Failed,
    Expired,
}

impl PaymentStatus {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "unpaid" => Some(Self::Unpaid),
            "processing" => Some(Self::Processing),
            "confirmed" => Some(Self::Confirmed),
            "finished" => Some(Self::Finished),
            "failed" => Some(Self::Failed),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Processing => "processing",
            Self::Confirmed => "confirmed",
            Self::Finished => "finished",
            Self::Failed => "failed",
            Self::Expired => "expired",
        }
    }

    /// Map a lower-cased gateway status onto the local enumeration.
    ///
    /// Returns `None` for vocabulary the gateway has not documented.
    pub fn from_gateway(s: &str) -> Option<Self> {
        match s {
            "waiting" | "confirming" | "sending" | "partially_paid" => Some(Self::Processing),
            "refunded" => Some(Self::Failed),
            other => Self::from_db(other),
        }
    }

    /// Payment succeeded (does not advance fulfillment)
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Finished)
    }
}

/// Payment sub-record embedded in an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Pay currency reported by the gateway (e.g. `btc`, `usdttrc20`)
    pub currency: String,
    pub invoice_id: String,
    /// Order id as known to the gateway; join key for webhook lookups
    pub external_order_id: String,
    pub tx_hash: String,
    /// Exact lower-cased status string from the last callback
    #[serde(default)]
    pub gateway_status: String,
    /// Last payload received from the gateway
    #[serde(default)]
    pub raw: Value,
}

impl Default for Payment {
    fn default() -> Self {
        Self {
            method: PaymentMethod::Crypto,
            status: PaymentStatus::Unpaid,
            currency: String::new(),
            invoice_id: String::new(),
            external_order_id: String::new(),
            tx_hash: String::new(),
            gateway_status: String::new(),
            raw: Value::Object(Default::default()),
        }
    }
}

/// Invoice creation payload
///
/// `amount` stays untyped so that a non-numeric value is reported as an
/// invalid amount.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceCreate {
    pub amount: Option<Value>,
    pub currency: Option<String>,
    pub meta: Option<Value>,
    pub order_id: Option<String>,
}

/// Invoice creation response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub invoice_id: String,
    pub invoice_url: String,
    /// External order reference sent to the gateway
    pub order_id: String,
    pub raw: Value,
}

/// One applied gateway callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEvent {
    pub id: i64,
    pub order_id: String,
    pub external_order_id: String,
    pub payment_id: String,
    pub status: PaymentStatus,
    pub gateway_status: String,
    pub pay_currency: String,
    pub amount: Option<f64>,
    pub payload: Value,
    pub received_at: i64,
}
