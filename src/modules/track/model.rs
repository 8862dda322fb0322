use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// Closed enumeration of lifecycle events the platform accepts.
/// Unknown wire strings are rejected at the boundary.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    PageView,
    MovieDetailView,
    SponsorClick,
    Search,
    PlayStart,
    PlayHeartbeat,
    PlayEnd,
    PlayerQuartile,
    PlayerStallStart,
    PlayerStallEnd,
    PlayerError,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::PageView => "page_view",
            EventType::MovieDetailView => "movie_detail_view",
            EventType::SponsorClick => "sponsor_click",
            EventType::Search => "search",
            EventType::PlayStart => "play_start",
            EventType::PlayHeartbeat => "play_heartbeat",
            EventType::PlayEnd => "play_end",
            EventType::PlayerQuartile => "player_quartile",
            EventType::PlayerStallStart => "player_stall_start",
            EventType::PlayerStallEnd => "player_stall_end",
            EventType::PlayerError => "player_error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "page_view" => Some(EventType::PageView),
            "movie_detail_view" => Some(EventType::MovieDetailView),
            "sponsor_click" => Some(EventType::SponsorClick),
            "search" => Some(EventType::Search),
            "play_start" => Some(EventType::PlayStart),
            "play_heartbeat" => Some(EventType::PlayHeartbeat),
            "play_end" => Some(EventType::PlayEnd),
            "player_quartile" => Some(EventType::PlayerQuartile),
            "player_stall_start" => Some(EventType::PlayerStallStart),
            "player_stall_end" => Some(EventType::PlayerStallEnd),
            "player_error" => Some(EventType::PlayerError),
            _ => None,
        }
    }

    /// Playback lifecycle events require a session id.
    pub fn is_playback(&self) -> bool {
        matches!(
            self,
            EventType::PlayStart | EventType::PlayHeartbeat | EventType::PlayEnd
        )
    }
}

/// A validated, server-stamped event on its way to the durable sink.
#[derive(Debug, Serialize, Clone)]
pub struct NewTrackEvent {
    pub event_type: EventType,
    /// Client-reported time, kept for audit; `server_ts` wins for any
    /// ordering decision.
    #[serde(with = "time::serde::rfc3339")]
    pub client_ts: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub server_ts: OffsetDateTime,
    pub session_id: Option<String>,
    pub movie_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub path: Option<String>,
    pub ip: String,
    pub user_agent: Option<String>,
    pub meta: serde_json::Value,
}

/// Event row as read back for reconciliation and reporting.
#[derive(Debug, Deserialize, FromRow, Clone)]
pub struct StoredTrackEvent {
    pub id: Uuid,
    pub event_type: String,
    pub client_ts: OffsetDateTime,
    pub server_ts: OffsetDateTime,
    pub session_id: Option<String>,
    pub movie_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub path: Option<String>,
    pub ip: String,
    pub user_agent: Option<String>,
    pub meta: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_round_trips_through_wire_names() {
        for ty in [
            EventType::PageView,
            EventType::PlayStart,
            EventType::PlayHeartbeat,
            EventType::PlayEnd,
            EventType::PlayerQuartile,
        ] {
            assert_eq!(EventType::parse(ty.as_str()), Some(ty));
        }
    }

    #[test]
    fn unknown_event_type_fails_serde() {
        let err = serde_json::from_str::<EventType>("\"made_up_event\"");
        assert!(err.is_err());
    }

    #[test]
    fn playback_classification() {
        assert!(EventType::PlayStart.is_playback());
        assert!(EventType::PlayHeartbeat.is_playback());
        assert!(EventType::PlayEnd.is_playback());
        assert!(!EventType::PageView.is_playback());
        assert!(!EventType::PlayerQuartile.is_playback());
    }
}
