//! API routes for cardhavi-api

pub mod auth;
pub mod cards;
pub mod extract;
pub mod health;
pub mod orders;
pub mod payments;

use axum::Router;
use axum::routing::get;
use http::{HeaderName, HeaderValue};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// uuid v4 request ids
#[derive(Clone, Default)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// All routes, without middleware
pub fn build_router() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/api/health", get(health::health_check))
        .merge(cards::router())
        .merge(auth::router())
        .merge(orders::router())
        .merge(payments::router())
}

/// Routes plus the middleware stack, bound to `state`
pub fn build_app(state: AppState) -> Router {
    build_router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .with_state(state)
}
