//! Shared types for the Cardhavi marketplace
//!
//! Common types used by the API server and its clients: the unified error
//! system, domain models and small utilities.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
