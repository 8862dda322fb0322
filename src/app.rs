use crate::state::AppState;
use axum::Router;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

// Grant issuance and ingestion are sub-second operations; anything
// hanging this long is a stuck collaborator.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn create_app(state: AppState) -> Router {
    crate::routes::configure_routes(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .with_state(state)
}
