//! Card Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Card rarity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Legendary,
    Rare,
    Uncommon,
    Common,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [
        Rarity::Legendary,
        Rarity::Rare,
        Rarity::Uncommon,
        Rarity::Common,
    ];

    /// Parse from database string value
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "Legendary" => Some(Self::Legendary),
            "Rare" => Some(Self::Rare),
            "Uncommon" => Some(Self::Uncommon),
            "Common" => Some(Self::Common),
            _ => None,
        }
    }

    /// Database string representation
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Legendary => "Legendary",
            Self::Rare => "Rare",
            Self::Uncommon => "Uncommon",
            Self::Common => "Common",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_db())
    }
}

/// Card entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub rarity: Rarity,
    pub rating: f64,
    pub in_stock: bool,
    pub stock: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Buy `promo_buy_qty`, get `promo_get_qty` free
    pub promo_active: bool,
    pub promo_buy_qty: i64,
    pub promo_get_qty: i64,
    /// Dollar amount shown next to the price (admin controlled)
    pub promo_get_amount: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create card payload
///
/// Required fields are optional here so that a missing field is reported as
/// a validation error rather than a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardCreate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub rarity: Option<String>,
    pub rating: Option<f64>,
    pub stock: Option<i64>,
    pub in_stock: Option<bool>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub promo_active: Option<bool>,
    pub promo_buy_qty: Option<i64>,
    pub promo_get_qty: Option<i64>,
    pub promo_get_amount: Option<f64>,
}

/// Update card payload (every field optional)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub rarity: Option<String>,
    pub rating: Option<f64>,
    pub stock: Option<i64>,
    pub in_stock: Option<bool>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub promo_active: Option<bool>,
    pub promo_buy_qty: Option<i64>,
    pub promo_get_qty: Option<i64>,
    pub promo_get_amount: Option<f64>,
}

impl CardUpdate {
    /// Effective in-stock flag: explicit value, else derived from a supplied stock count
    pub fn effective_in_stock(&self) -> Option<bool> {
        self.in_stock.or(self.stock.map(|s| s > 0))
    }
}

/// Response for card deletion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}
