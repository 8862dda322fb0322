use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Hls,
    Dash,
    Mp4,
}

impl SourceKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hls" => Some(SourceKind::Hls),
            "dash" => Some(SourceKind::Dash),
            "mp4" => Some(SourceKind::Mp4),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Image,
    Html,
}

impl OverlayKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "image" => Some(OverlayKind::Image),
            "html" => Some(OverlayKind::Html),
            _ => None,
        }
    }
}

/// Screen corner the sponsor creative is pinned to.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OverlayPlacement {
    Tl,
    Tr,
    Bl,
    Br,
}

impl OverlayPlacement {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tl" => Some(OverlayPlacement::Tl),
            "tr" => Some(OverlayPlacement::Tr),
            "bl" => Some(OverlayPlacement::Bl),
            "br" => Some(OverlayPlacement::Br),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DrmInfo {
    pub scheme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_url: Option<String>,
}

#[derive(Debug, Serialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaySource {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub label: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drm: Option<DrmInfo>,
}

#[derive(Debug, Serialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleTrack {
    pub lang: String,
    pub label: String,
    pub url: String,
}

/// Timed sponsor creative; `start`/`end` are seconds relative to
/// playback start.
#[derive(Debug, Serialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySlot {
    #[serde(rename = "type")]
    pub kind: OverlayKind,
    pub placement: OverlayPlacement,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    pub opacity: f64,
}

/// A time-bounded, resumable playback authorization.
///
/// Immutable once issued; re-requesting playback mints a new grant with
/// a new id. Events are correlated back to it via `grant_id` and the
/// client's session id.
#[derive(Debug, Serialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayGrant {
    pub grant_id: Uuid,
    pub content_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub issued_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub expires_at: OffsetDateTime,
    pub sources: Vec<PlaySource>,
    pub subtitles: Vec<SubtitleTrack>,
    pub overlays: Vec<OverlaySlot>,
    pub heartbeat_interval_seconds: i64,
}
