//! Application state for cardhavi-api

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;
use crate::nowpayments::{InvoiceSettings, NowPaymentsClient, PaymentGateway};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool
    pub pool: SqlitePool,
    /// Invoice creation backend
    pub gateway: Arc<dyn PaymentGateway>,
    /// Redirect/callback URLs and pay currencies for invoices
    pub invoice: InvoiceSettings,
    /// IPN secret; webhooks are rejected while unset
    pub ipn_secret: Option<String>,
}

impl AppState {
    /// Connect (retrying until the store is reachable), migrate, build the gateway client
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = db::connect_with_retry(&config.database_url).await;
        db::migrate(&pool).await?;

        let gateway = NowPaymentsClient::new(
            &config.nowpayments_api_url,
            config.nowpayments_api_key.clone(),
            Duration::from_secs(config.gateway_timeout_secs),
        )?;

        Ok(Self {
            pool,
            gateway: Arc::new(gateway),
            invoice: InvoiceSettings {
                public_base_url: config.public_base_url.clone(),
                public_api_url: config.public_api_url.clone(),
                pay_currencies: config.pay_currencies.clone(),
            },
            ipn_secret: config.nowpayments_ipn_secret.clone(),
        })
    }

    /// Assemble state from parts (tests and embedding)
    pub fn with_parts(
        pool: SqlitePool,
        gateway: Arc<dyn PaymentGateway>,
        invoice: InvoiceSettings,
        ipn_secret: Option<String>,
    ) -> Self {
        Self {
            pool,
            gateway,
            invoice,
            ipn_secret,
        }
    }
}
