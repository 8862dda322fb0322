use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct PlayQuery {
    /// Requested grant lifetime in seconds; clamped to the server cap.
    pub ttl: Option<i64>,
}
