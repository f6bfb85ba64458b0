//! cardhavi-api: trading card marketplace backend
//!
//! - Catalog, accounts and orders over a SQLite document store
//! - Crypto checkout through NOWPayments hosted invoices
//! - Signed IPN callbacks reconciled onto orders, with an append-only event log

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod nowpayments;
pub mod reconcile;
pub mod state;
pub mod util;

pub use config::Config;
pub use state::AppState;
