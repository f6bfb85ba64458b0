//! Order API

mod handler;

use axum::Router;
use axum::routing::{get, patch};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/user/{user_id}", get(handler::list_by_user))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", patch(handler::update_status))
        .route("/{id}/payment-events", get(handler::payment_events))
}
