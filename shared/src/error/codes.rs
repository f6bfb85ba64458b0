//! Error codes for the Cardhavi marketplace
//!
//! Codes are grouped by range:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog errors
//! - 9xxx: System errors

use std::fmt;

/// Error code carried in every error body as a plain number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource already exists
    AlreadyExists = 4,
    /// Malformed request body
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Email is already registered
    EmailAlreadyRegistered = 1008,

    // ==================== 4xxx: Order ====================
    OrderNotFound = 4001,
    /// Order has no line items
    OrderEmpty = 4007,
    /// Fulfillment status outside the allowed set
    OrderInvalidStatus = 4008,

    // ==================== 5xxx: Payment ====================
    /// Invoice amount is missing, non-numeric or not positive
    PaymentInvalidAmount = 5006,
    /// Payment gateway credentials are not configured
    PaymentGatewayNotConfigured = 5007,
    /// Payment gateway rejected or failed the invoice request
    InvoiceCreationFailed = 5008,

    // ==================== 6xxx: Catalog ====================
    CardNotFound = 6001,
    /// Negative or non-finite price
    CardInvalidPrice = 6002,
    /// Rarity outside Legendary/Rare/Uncommon/Common
    CardInvalidRarity = 6005,

    // ==================== 9xxx: System ====================
    InternalError = 9001,
}

impl ErrorCode {
    /// Numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Default message for this code
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",

            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::EmailAlreadyRegistered => "Email already registered",

            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order is empty",
            ErrorCode::OrderInvalidStatus => "Invalid status",

            ErrorCode::PaymentInvalidAmount => "Invalid amount",
            ErrorCode::PaymentGatewayNotConfigured => "Payment gateway is not configured",
            ErrorCode::InvoiceCreationFailed => "Failed to create invoice",

            ErrorCode::CardNotFound => "Card not found",
            ErrorCode::CardInvalidPrice => "Card has invalid price",
            ErrorCode::CardInvalidRarity => "Invalid rarity",

            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
