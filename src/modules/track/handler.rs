use crate::common::error::ServiceError;
use crate::common::net::RequestContext;
use crate::modules::track::dto::TrackEventRequest;
use crate::modules::track::service::TrackService;
use crate::state::AppState;
use axum::{
    Json,
    extract::{ConnectInfo, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::net::SocketAddr;
use validator::Validate;

#[utoipa::path(
    post,
    path = "/v1/track",
    request_body = TrackEventRequest,
    responses(
        (status = 204, description = "Event accepted"),
        (status = 400, description = "Malformed payload or unknown event type"),
        (status = 403, description = "Grant expired"),
        (status = 429, description = "Heartbeat rate limit exceeded")
    ),
    tag = "Tracking"
)]
pub async fn ingest_event(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    payload: Result<Json<TrackEventRequest>, JsonRejection>,
) -> impl IntoResponse {
    // Unknown event types and malformed bodies are both a 400, not the
    // extractor's default 422.
    let Json(req) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            return ServiceError::Validation(rejection.body_text()).into_response();
        }
    };

    if let Err(e) = req.validate() {
        return ServiceError::Validation(e.to_string()).into_response();
    }

    let ctx = RequestContext::from_parts(&headers, Some(peer));

    match TrackService::ingest(state, req, ctx).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
