use crate::common::response::{ApiResponse, ApiSuccess};
use crate::modules::session::dto::SessionReport;
use crate::modules::session::service::SessionService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

#[utoipa::path(
    get,
    path = "/v1/sessions/{id}",
    params(
        ("id" = String, Path, description = "Client-generated session ID")
    ),
    responses(
        (status = 200, description = "Session reconciled", body = ApiResponse<SessionReport>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Session Not Found")
    ),
    tag = "Sessions",
    security(("bearer_auth" = []))
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match SessionService::reconcile(state, &id).await {
        Ok(report) => ApiSuccess(
            ApiResponse::success(report, "Session reconciled successfully"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => e.into_response(),
    }
}
