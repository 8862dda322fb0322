use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Slice of the platform's movie row this service needs for playback.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ContentSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub status: Option<String>,
    pub duration_seconds: Option<i32>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct SourceRow {
    pub id: Uuid,
    pub kind: String,
    pub label: String,
    pub storage_key: Option<String>,
    pub external_url: Option<String>,
    pub drm_scheme: Option<String>,
    pub drm_license_url: Option<String>,
    pub position: i32,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct SubtitleRow {
    pub lang: String,
    pub label: String,
    pub storage_key: Option<String>,
    pub external_url: Option<String>,
}

/// Sponsor creative row; timing and opacity are authored in the admin
/// console and validated again at grant issuance.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct OverlayRow {
    pub id: Uuid,
    pub kind: String,
    pub placement: String,
    pub starts_at: Option<i32>,
    pub ends_at: Option<i32>,
    pub storage_key: Option<String>,
    pub external_url: Option<String>,
    pub html: Option<String>,
    pub href: Option<String>,
    pub opacity: f64,
}

/// Everything Content Lookup returns for one content id.
#[derive(Debug, Clone)]
pub struct ResolvedContent {
    pub movie: ContentSummary,
    pub sources: Vec<SourceRow>,
    pub subtitles: Vec<SubtitleRow>,
    pub overlays: Vec<OverlayRow>,
}
