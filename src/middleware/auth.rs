use crate::common::error::ServiceError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims minted by the platform backend; this service only verifies.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    pub sub: Uuid,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_header| auth_header.to_str().ok())
        .and_then(|auth_value| auth_value.strip_prefix("Bearer "))
        .map(|t| t.to_owned())
        .ok_or(ServiceError::Unauthorized("missing or invalid token"))?;

    // Revoked tokens live in the shared redis blocklist.
    let mut redis = state
        .redis
        .get_conn()
        .await
        .map_err(|e| ServiceError::Internal(e.into()))?;

    let is_blocked: bool = redis
        .exists(format!("blocked_token:{}", token))
        .await
        .map_err(|e| ServiceError::Internal(e.into()))?;

    if is_blocked {
        return Err(ServiceError::Unauthorized("token is revoked"));
    }

    let claims = decode::<TokenClaims>(
        &token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ServiceError::Unauthorized("invalid token signature"))?
    .claims;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
