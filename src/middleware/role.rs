use crate::common::error::ServiceError;
use crate::middleware::auth::TokenClaims;
use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::Response,
};

pub async fn admin_guard(
    Extension(claims): Extension<TokenClaims>,
    req: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    if claims.role != "ADMIN" {
        return Err(ServiceError::Forbidden("admin access required"));
    }

    Ok(next.run(req).await)
}
