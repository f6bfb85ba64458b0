//! Cardhavi Client - storefront client for the marketplace API
//!
//! - [`HttpClient`]: typed REST calls
//! - [`Storefront`]: server-first reads with a local file cache fallback and
//!   an offline order outbox

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod storefront;

pub use cache::{LocalCache, PendingOrder};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use storefront::{Fetched, Placed, Source, Storefront, SyncReport};
