//! Account API (signup / login)

mod handler;

use axum::Router;
use axum::routing::post;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(handler::signup))
        .route("/api/auth/login", post(handler::login))
}
