//! API server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// API server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// HTTP port
    pub http_port: u16,
    /// SQLite connection URL
    pub database_url: String,
    /// NOWPayments API key (absent only in development)
    pub nowpayments_api_key: Option<String>,
    /// NOWPayments IPN secret for webhook signatures (absent only in development)
    pub nowpayments_ipn_secret: Option<String>,
    /// NOWPayments API base URL
    pub nowpayments_api_url: String,
    /// Comma separated pay currencies offered on the hosted invoice page
    pub pay_currencies: String,
    /// Storefront base URL for success/cancel redirects
    pub public_base_url: String,
    /// Public API base URL for the IPN callback
    pub public_api_url: String,
    /// Timeout for outbound gateway calls
    pub gateway_timeout_secs: u64,
}

impl Config {
    /// Read a secret env var: must be set and non-empty outside development.
    fn require_secret(name: &str, environment: &str) -> Result<Option<String>, BoxError> {
        match std::env::var(name) {
            Ok(v) if !v.is_empty() => Ok(Some(v)),
            Ok(_) if environment != "development" => {
                Err(format!("{name} must not be empty in {environment} environment").into())
            }
            Err(_) if environment != "development" => {
                Err(format!("{name} must be set in {environment} environment").into())
            }
            _ => {
                tracing::warn!("{name} is not set; crypto payments are disabled");
                Ok(None)
            }
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(4001),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://cardhavi.db".into()),
            nowpayments_api_key: Self::require_secret("NOWPAYMENTS_API_KEY", &environment)?,
            nowpayments_ipn_secret: Self::require_secret("NOWPAYMENTS_IPN_SECRET", &environment)?,
            nowpayments_api_url: std::env::var("NOWPAYMENTS_API_URL")
                .unwrap_or_else(|_| "https://api.nowpayments.io".into()),
            pay_currencies: std::env::var("NOWPAYMENTS_PAY_CURRENCIES")
                .unwrap_or_else(|_| "btc,usdttrc20".into()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            public_api_url: std::env::var("PUBLIC_API_URL")
                .unwrap_or_else(|_| "http://localhost:4001".into()),
            gateway_timeout_secs: std::env::var("GATEWAY_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            environment,
        })
    }
}
