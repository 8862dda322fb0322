use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::common::response::ApiResponse;

/// Error taxonomy for the playback path.
///
/// Everything here maps to a client-visible status except `Sink`, which
/// the ingestion pipeline logs and swallows: tracking outages must never
/// degrade playback.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("content has no playable source")]
    ContentUnavailable,

    #[error("invalid event: {0}")]
    Validation(String),

    #[error("grant expired or unknown")]
    GrantExpired,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    #[error("event sink write failed: {0}")]
    Sink(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::InvalidArgument(_) | ServiceError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::ContentUnavailable => StatusCode::CONFLICT,
            ServiceError::GrantExpired => StatusCode::FORBIDDEN,
            ServiceError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::Sink(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details stay in the logs; the wire gets a generic line.
        let message = match &self {
            ServiceError::Internal(e) => {
                error!("internal error: {e:#}");
                "internal server error".to_string()
            }
            ServiceError::Sink(e) => {
                error!("sink failure escaped to a handler: {e}");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ApiResponse::<()>::error(&message);
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(
            ServiceError::NotFound("movie").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::InvalidArgument("ttl".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::ContentUnavailable.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::GrantExpired.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ServiceError::RateLimited.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }
}
