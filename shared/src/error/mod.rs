//! Unified error system for the Cardhavi marketplace
//!
//! - [`ErrorCode`]: numeric error codes, grouped by range
//! - [`ErrorCategory`]: classification of codes by domain
//! - [`AppError`]: error with code, message and optional details
//! - [`ErrorBody`]: the JSON error body every endpoint returns
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorBody, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::CardNotFound);
//!
//! let err = AppError::with_message(ErrorCode::PaymentInvalidAmount, "Invalid amount");
//!
//! let err = AppError::validation("Missing required field")
//!     .with_detail("field", "price");
//!
//! let body = ErrorBody::from(&err);
//! assert_eq!(body.code, 2);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::ErrorCode;
pub use types::{AppError, ErrorBody};
