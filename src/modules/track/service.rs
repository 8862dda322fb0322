use super::dto::TrackEventRequest;
use super::model::{EventType, NewTrackEvent};
use crate::common::error::ServiceError;
use crate::common::net::RequestContext;
use crate::state::AppState;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

pub struct TrackService;

impl TrackService {
    /// Validate, stamp and dispatch one client event.
    ///
    /// Acceptance is decoupled from durability: once the event clears
    /// validation and the replay guard it is handed to the sink channel
    /// and the caller gets its 204. Sink trouble is an operations
    /// problem, never a playback problem.
    pub async fn ingest(
        state: AppState,
        req: TrackEventRequest,
        ctx: RequestContext,
    ) -> Result<(), ServiceError> {
        let session_id = normalize_session_id(req.session_id.as_deref());

        if req.event_type.is_playback() && session_id.is_none() {
            return Err(ServiceError::Validation(format!(
                "{} requires a sessionId",
                req.event_type.as_str()
            )));
        }

        let meta = match req.meta {
            None => serde_json::json!({}),
            Some(value) if value.is_object() => value,
            Some(_) => {
                return Err(ServiceError::Validation(
                    "meta must be a JSON object".to_string(),
                ));
            }
        };

        match req.event_type {
            EventType::PlayStart => {
                if let Some(grant_id) = grant_id_from_meta(&meta) {
                    state.guard.check_grant(grant_id).await?;
                }
            }
            EventType::PlayHeartbeat => {
                if let Some(sid) = &session_id {
                    state.guard.check_heartbeat(sid)?;
                }
            }
            _ => {}
        }

        let server_ts = OffsetDateTime::now_utc();
        let event = NewTrackEvent {
            event_type: req.event_type,
            // Absent client timestamps are normalized to server time;
            // divergent ones are kept as sent.
            client_ts: req.timestamp.unwrap_or(server_ts),
            server_ts,
            session_id,
            movie_id: req.movie_id,
            user_id: req.user_id,
            path: req.path,
            ip: ctx.ip,
            user_agent: ctx.user_agent,
            meta,
        };

        debug!(
            event_type = event.event_type.as_str(),
            session_id = event.session_id.as_deref().unwrap_or("-"),
            "accepted track event"
        );

        state.sink.dispatch(event);
        Ok(())
    }
}

fn normalize_session_id(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn grant_id_from_meta(meta: &serde_json::Value) -> Option<Uuid> {
    meta.get("grantId")
        .and_then(|v| v.as_str())
        .and_then(|s| Uuid::parse_str(s).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_session_ids_are_dropped() {
        assert_eq!(normalize_session_id(Some("  ")), None);
        assert_eq!(normalize_session_id(Some("")), None);
        assert_eq!(normalize_session_id(None), None);
        assert_eq!(normalize_session_id(Some(" s1 ")), Some("s1".to_string()));
    }

    #[test]
    fn grant_id_is_read_from_meta() {
        let id = Uuid::new_v4();
        let meta = serde_json::json!({ "grantId": id.to_string() });
        assert_eq!(grant_id_from_meta(&meta), Some(id));
    }

    #[test]
    fn malformed_or_missing_grant_id_is_ignored() {
        assert_eq!(grant_id_from_meta(&serde_json::json!({})), None);
        assert_eq!(
            grant_id_from_meta(&serde_json::json!({ "grantId": "not-a-uuid" })),
            None
        );
        assert_eq!(
            grant_id_from_meta(&serde_json::json!({ "grantId": 7 })),
            None
        );
    }
}
