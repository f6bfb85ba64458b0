//! Data models
//!
//! Shared between cardhavi-api and its clients (via the REST API).
//! Wire format is camelCase; timestamps are epoch milliseconds.

pub mod card;
pub mod order;
pub mod payment;
pub mod user;

// Re-exports
pub use card::*;
pub use order::*;
pub use payment::*;
pub use user::*;
