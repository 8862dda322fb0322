use axum::Router;
use axum::routing::post;
use tower_http::limit::RequestBodyLimitLayer;
use crate::state::AppState;

pub mod dto;
pub mod handler;
pub mod model;
pub mod repository;
pub mod service;
pub mod sink;

// Track payloads are small; anything bigger is abuse.
const MAX_EVENT_BODY_BYTES: usize = 16 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handler::ingest_event))
        .layer(RequestBodyLimitLayer::new(MAX_EVENT_BODY_BYTES))
}
