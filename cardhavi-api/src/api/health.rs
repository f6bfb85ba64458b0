//! Health check endpoints

use axum::Json;

/// GET /api/health
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "cardhavi-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET / (liveness probe used by the hosting platform)
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "activeStatus": true,
        "error": false,
    }))
}
