//! Logging Infrastructure
//!
//! `RUST_LOG` overrides the default filter; `LOG_FORMAT=json` switches to
//! one JSON object per line for log shippers.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "cardhavi_api=info,tower_http=info";

/// Initialize the global subscriber
pub fn init_logger(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_ids(false)
        .with_target(true);

    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// `LOG_FORMAT=json` (case-insensitive)
pub fn json_from_env() -> bool {
    std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
