use super::model::EventType;
use serde::Deserialize;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Wire shape of `POST /v1/track`.
///
/// `type` must be in the event enumeration; everything else is an
/// optional correlation field. `meta` is an extension bag validated
/// only at the base-field level.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackEventRequest {
    #[serde(rename = "type")]
    pub event_type: EventType,

    /// Client clock, kept for audit; skew against server time is
    /// expected and not corrected.
    #[serde(default, with = "time::serde::rfc3339::option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub timestamp: Option<OffsetDateTime>,

    #[validate(length(min = 1, max = 128, message = "sessionId must be 1-128 characters"))]
    pub session_id: Option<String>,

    pub user_id: Option<Uuid>,

    #[validate(length(max = 2048, message = "path too long"))]
    pub path: Option<String>,

    pub movie_id: Option<Uuid>,

    pub meta: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_payload_deserializes() {
        let req: TrackEventRequest =
            serde_json::from_str(r#"{"type":"page_view"}"#).unwrap();
        assert_eq!(req.event_type, EventType::PageView);
        assert!(req.session_id.is_none());
        assert!(req.timestamp.is_none());
    }

    #[test]
    fn full_payload_deserializes() {
        let req: TrackEventRequest = serde_json::from_str(
            r#"{
                "type": "play_heartbeat",
                "timestamp": "2026-01-01T00:00:30Z",
                "sessionId": "s1",
                "movieId": "a9f2cbf4-7a4f-4f8e-9f50-3b0d1a9b6c01",
                "path": "/watch/a9f2cbf4",
                "meta": {"grantId": "1c7c2a9e-02a5-4a1f-8a44-58a1b2dd2f10", "position": 30}
            }"#,
        )
        .unwrap();
        assert_eq!(req.event_type, EventType::PlayHeartbeat);
        assert_eq!(req.session_id.as_deref(), Some("s1"));
        assert!(req.timestamp.is_some());
        assert!(req.meta.unwrap().get("grantId").is_some());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = serde_json::from_str::<TrackEventRequest>(r#"{"type":"telemetry_blob"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn missing_type_is_rejected() {
        let err = serde_json::from_str::<TrackEventRequest>(r#"{"sessionId":"s1"}"#);
        assert!(err.is_err());
    }
}
