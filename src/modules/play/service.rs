use super::model::{
    DrmInfo, OverlayKind, OverlayPlacement, OverlaySlot, PlayGrant, PlaySource, SourceKind,
    SubtitleTrack,
};
use crate::common::error::ServiceError;
use crate::infrastructure::storage::s3::StorageService;
use crate::modules::catalog::model::{OverlayRow, SourceRow, SubtitleRow};
use crate::modules::catalog::service::ContentLookup;
use crate::state::AppState;
use std::time::Duration as StdDuration;
use time::{Duration, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

pub struct PlayService;

impl PlayService {
    /// Issue a playback grant for a content id.
    ///
    /// Stateless apart from the replay-guard record; a repeated request
    /// produces an independent grant with its own id and window.
    pub async fn issue(
        state: AppState,
        content_id: Uuid,
        requested_ttl: Option<i64>,
    ) -> Result<PlayGrant, ServiceError> {
        let ttl = clamp_ttl(
            requested_ttl,
            state.config.grant_ttl_seconds,
            state.config.grant_max_ttl_seconds,
        )?;

        let content = ContentLookup::resolve(&state.db, content_id)
            .await?
            .ok_or(ServiceError::NotFound("movie"))?;

        // An unplayable title is a hard error, never a grant with
        // substitute sources.
        if content.movie.status.as_deref().is_some_and(|s| s != "READY") {
            return Err(ServiceError::ContentUnavailable);
        }
        if content.sources.is_empty() {
            return Err(ServiceError::ContentUnavailable);
        }

        let mut sources = Vec::with_capacity(content.sources.len());
        for row in &content.sources {
            sources.push(build_source(&state.storage, row, ttl).await?);
        }

        let mut subtitles = Vec::with_capacity(content.subtitles.len());
        for row in &content.subtitles {
            subtitles.push(build_subtitle(&state.storage, row, ttl).await?);
        }

        let mut overlays = Vec::with_capacity(content.overlays.len());
        for row in &content.overlays {
            overlays.push(build_overlay(&state.storage, row, ttl).await?);
        }

        let (issued_at, expires_at) = grant_window(OffsetDateTime::now_utc(), ttl);
        let grant_id = Uuid::new_v4();

        state.guard.record_issue(grant_id, ttl).await;

        info!(
            grant_id = %grant_id,
            content_id = %content_id,
            ttl_seconds = ttl,
            "issued play grant"
        );

        Ok(PlayGrant {
            grant_id,
            content_id,
            issued_at,
            expires_at,
            sources,
            subtitles,
            overlays,
            heartbeat_interval_seconds: state.config.heartbeat_interval_seconds,
        })
    }
}

/// Resolve the requested ttl against the configured default and cap.
pub fn clamp_ttl(
    requested: Option<i64>,
    default_ttl: i64,
    max_ttl: i64,
) -> Result<i64, ServiceError> {
    match requested {
        None => Ok(default_ttl),
        Some(ttl) if ttl <= 0 => Err(ServiceError::InvalidArgument(format!(
            "ttl must be positive, got {ttl}"
        ))),
        Some(ttl) => Ok(ttl.min(max_ttl)),
    }
}

pub fn grant_window(now: OffsetDateTime, ttl_seconds: i64) -> (OffsetDateTime, OffsetDateTime) {
    (now, now + Duration::seconds(ttl_seconds))
}

/// Check an authored overlay row before it goes out in a grant.
/// Authoring errors surface as `InvalidArgument`, never as silent
/// clamping.
pub fn validate_overlay(row: &OverlayRow) -> Result<(OverlayKind, OverlayPlacement), ServiceError> {
    let kind = OverlayKind::parse(&row.kind).ok_or_else(|| {
        ServiceError::InvalidArgument(format!("unknown overlay type '{}'", row.kind))
    })?;

    let placement = OverlayPlacement::parse(&row.placement).ok_or_else(|| {
        ServiceError::InvalidArgument(format!("unknown overlay placement '{}'", row.placement))
    })?;

    if let Some(start) = row.starts_at {
        if start < 0 {
            return Err(ServiceError::InvalidArgument(format!(
                "overlay start must be >= 0, got {start}"
            )));
        }
    }
    if let (Some(start), Some(end)) = (row.starts_at, row.ends_at) {
        if start >= end {
            return Err(ServiceError::InvalidArgument(format!(
                "overlay window must satisfy start < end, got {start}..{end}"
            )));
        }
    }

    if !(0.0..=1.0).contains(&row.opacity) {
        return Err(ServiceError::InvalidArgument(format!(
            "overlay opacity must be within [0, 1], got {}",
            row.opacity
        )));
    }

    match kind {
        OverlayKind::Image if row.storage_key.is_none() && row.external_url.is_none() => {
            Err(ServiceError::InvalidArgument(
                "image overlay has no asset".to_string(),
            ))
        }
        OverlayKind::Html if row.html.is_none() => Err(ServiceError::InvalidArgument(
            "html overlay has no markup".to_string(),
        )),
        _ => Ok((kind, placement)),
    }
}

/// Turn an authored asset reference into a client-usable URL: external
/// URLs pass through after a parse check, storage keys get presigned
/// with the grant's ttl.
async fn resolve_asset_url(
    storage: &StorageService,
    storage_key: Option<&str>,
    external_url: Option<&str>,
    ttl_seconds: i64,
) -> Result<String, ServiceError> {
    if let Some(external) = external_url {
        url::Url::parse(external).map_err(|_| {
            ServiceError::InvalidArgument(format!("malformed external url '{external}'"))
        })?;
        return Ok(external.to_string());
    }

    let key = storage_key.ok_or_else(|| {
        ServiceError::InvalidArgument("asset has neither storage key nor url".to_string())
    })?;

    storage
        .presign_get(key, StdDuration::from_secs(ttl_seconds.unsigned_abs()))
        .await
        .map_err(ServiceError::Internal)
}

async fn build_source(
    storage: &StorageService,
    row: &SourceRow,
    ttl_seconds: i64,
) -> Result<PlaySource, ServiceError> {
    let kind = SourceKind::parse(&row.kind).ok_or_else(|| {
        ServiceError::InvalidArgument(format!("unknown source type '{}'", row.kind))
    })?;

    let url = resolve_asset_url(
        storage,
        row.storage_key.as_deref(),
        row.external_url.as_deref(),
        ttl_seconds,
    )
    .await?;

    let drm = row.drm_scheme.as_ref().map(|scheme| DrmInfo {
        scheme: scheme.clone(),
        license_url: row.drm_license_url.clone(),
    });

    Ok(PlaySource {
        id: row.id,
        kind,
        label: row.label.clone(),
        url,
        drm,
    })
}

async fn build_subtitle(
    storage: &StorageService,
    row: &SubtitleRow,
    ttl_seconds: i64,
) -> Result<SubtitleTrack, ServiceError> {
    let url = resolve_asset_url(
        storage,
        row.storage_key.as_deref(),
        row.external_url.as_deref(),
        ttl_seconds,
    )
    .await?;

    Ok(SubtitleTrack {
        lang: row.lang.clone(),
        label: row.label.clone(),
        url,
    })
}

async fn build_overlay(
    storage: &StorageService,
    row: &OverlayRow,
    ttl_seconds: i64,
) -> Result<OverlaySlot, ServiceError> {
    let (kind, placement) = validate_overlay(row)?;

    let url = match kind {
        OverlayKind::Image => Some(
            resolve_asset_url(
                storage,
                row.storage_key.as_deref(),
                row.external_url.as_deref(),
                ttl_seconds,
            )
            .await?,
        ),
        OverlayKind::Html => None,
    };

    Ok(OverlaySlot {
        kind,
        placement,
        start: row.starts_at.map(i64::from),
        end: row.ends_at.map(i64::from),
        url,
        html: row.html.clone(),
        href: row.href.clone(),
        opacity: row.opacity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn overlay_row() -> OverlayRow {
        OverlayRow {
            id: Uuid::new_v4(),
            kind: "image".to_string(),
            placement: "tr".to_string(),
            starts_at: Some(10),
            ends_at: Some(40),
            storage_key: Some("sponsors/banner.png".to_string()),
            external_url: None,
            html: None,
            href: Some("https://sponsor.example.com".to_string()),
            opacity: 0.8,
        }
    }

    #[test]
    fn ttl_defaults_when_absent() {
        assert_eq!(clamp_ttl(None, 900, 3600).unwrap(), 900);
    }

    #[test]
    fn ttl_zero_and_negative_are_rejected() {
        assert!(matches!(
            clamp_ttl(Some(0), 900, 3600),
            Err(ServiceError::InvalidArgument(_))
        ));
        assert!(matches!(
            clamp_ttl(Some(-5), 900, 3600),
            Err(ServiceError::InvalidArgument(_))
        ));
    }

    #[test]
    fn ttl_is_clamped_to_the_configured_max() {
        assert_eq!(clamp_ttl(Some(7200), 900, 3600).unwrap(), 3600);
        assert_eq!(clamp_ttl(Some(60), 900, 3600).unwrap(), 60);
    }

    #[test]
    fn grant_window_is_exactly_ttl_wide() {
        let now = datetime!(2026-01-01 00:00:00 UTC);
        let (issued_at, expires_at) = grant_window(now, 900);
        assert_eq!((expires_at - issued_at).whole_seconds(), 900);
        assert_eq!(issued_at, now);
    }

    #[test]
    fn inverted_overlay_window_is_rejected() {
        let mut row = overlay_row();
        row.starts_at = Some(30);
        row.ends_at = Some(10);
        assert!(matches!(
            validate_overlay(&row),
            Err(ServiceError::InvalidArgument(_))
        ));
    }

    #[test]
    fn overlay_opacity_bounds_are_inclusive() {
        let mut row = overlay_row();
        row.opacity = 0.0;
        assert!(validate_overlay(&row).is_ok());
        row.opacity = 1.0;
        assert!(validate_overlay(&row).is_ok());
        row.opacity = 1.5;
        assert!(matches!(
            validate_overlay(&row),
            Err(ServiceError::InvalidArgument(_))
        ));
        row.opacity = -0.1;
        assert!(validate_overlay(&row).is_err());
    }

    #[test]
    fn html_overlay_requires_markup() {
        let mut row = overlay_row();
        row.kind = "html".to_string();
        row.html = None;
        assert!(validate_overlay(&row).is_err());

        row.html = Some("<div>ad</div>".to_string());
        assert!(validate_overlay(&row).is_ok());
    }

    #[test]
    fn unknown_placement_is_rejected() {
        let mut row = overlay_row();
        row.placement = "center".to_string();
        assert!(matches!(
            validate_overlay(&row),
            Err(ServiceError::InvalidArgument(_))
        ));
    }

    #[test]
    fn source_kind_parses_wire_names() {
        assert_eq!(SourceKind::parse("hls"), Some(SourceKind::Hls));
        assert_eq!(SourceKind::parse("dash"), Some(SourceKind::Dash));
        assert_eq!(SourceKind::parse("mp4"), Some(SourceKind::Mp4));
        assert_eq!(SourceKind::parse("rtmp"), None);
    }
}
