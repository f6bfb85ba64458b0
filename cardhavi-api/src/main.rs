//! cardhavi-api: trading card marketplace backend

use cardhavi_api::{AppState, Config, api, logger};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    logger::init_logger(logger::json_from_env());

    let config = Config::from_env()?;

    tracing::info!("Starting cardhavi-api (env: {})", config.environment);

    let state = AppState::new(&config).await?;
    let app = api::build_app(state);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("cardhavi-api HTTP listening on {http_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
