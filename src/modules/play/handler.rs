use crate::modules::play::dto::PlayQuery;
use crate::modules::play::model::PlayGrant;
use crate::modules::play::service::PlayService;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/v1/movies/{id}/play",
    params(
        ("id" = Uuid, Path, description = "Movie ID"),
        PlayQuery
    ),
    responses(
        (status = 200, description = "Play grant issued", body = PlayGrant),
        (status = 400, description = "Invalid ttl or authoring error"),
        (status = 404, description = "Movie not found"),
        (status = 409, description = "Movie has no playable source"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Playback"
)]
pub async fn issue_grant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PlayQuery>,
) -> impl IntoResponse {
    match PlayService::issue(state, id, query.ttl).await {
        Ok(grant) => (StatusCode::OK, Json(grant)).into_response(),
        Err(e) => e.into_response(),
    }
}
