//! Order Model

use super::payment::Payment;
use serde::{Deserialize, Serialize};

/// Fulfillment lifecycle: `pending -> packed -> shipped -> delivered`, or `cancelled`.
///
/// Transitions are not enforced; an admin may set any value at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentStatus {
    #[default]
    Pending,
    Packed,
    Shipped,
    Delivered,
    Cancelled,
}

impl FulfillmentStatus {
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "packed" => Some(Self::Packed),
            "shipped" => Some(Self::Shipped),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Packed => "packed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

/// User snapshot captured at order time (not a live reference)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Line item captured at order time (not a live reference to a card)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id: Option<String>,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user: OrderUser,
    pub items: Vec<OrderItem>,
    /// Caller-supplied total, stored as given
    pub total: f64,
    pub address: String,
    pub status: FulfillmentStatus,
    pub payment: Payment,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create order payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderCreate {
    pub user: Option<OrderUser>,
    pub items: Option<Vec<OrderItem>>,
    pub total: Option<f64>,
    pub address: Option<String>,
}

/// Fulfillment status update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: Option<String>,
}
