use super::model::{ContentSummary, OverlayRow, SourceRow, SubtitleRow};
use anyhow::{Result, anyhow};
use sqlx::PgPool;
use uuid::Uuid;

pub struct CatalogRepository;

impl CatalogRepository {
    pub async fn get_movie_by_id(pool: &PgPool, id: Uuid) -> Result<Option<ContentSummary>> {
        let movie = sqlx::query_as::<_, ContentSummary>(
            r#"
            SELECT id, title, slug, status, duration_seconds, created_at
            FROM movies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| anyhow!("Failed to fetch movie: {}", e))?;

        Ok(movie)
    }

    pub async fn get_active_sources(pool: &PgPool, movie_id: Uuid) -> Result<Vec<SourceRow>> {
        let sources = sqlx::query_as::<_, SourceRow>(
            r#"
            SELECT id, kind, label, storage_key, external_url,
                   drm_scheme, drm_license_url, position
            FROM movie_sources
            WHERE movie_id = $1 AND active = TRUE
            ORDER BY position ASC
            "#,
        )
        .bind(movie_id)
        .fetch_all(pool)
        .await
        .map_err(|e| anyhow!("Failed to fetch sources: {}", e))?;

        Ok(sources)
    }

    pub async fn get_subtitles(pool: &PgPool, movie_id: Uuid) -> Result<Vec<SubtitleRow>> {
        let subtitles = sqlx::query_as::<_, SubtitleRow>(
            r#"
            SELECT lang, label, storage_key, external_url
            FROM movie_subtitles
            WHERE movie_id = $1 AND active = TRUE
            ORDER BY lang ASC
            "#,
        )
        .bind(movie_id)
        .fetch_all(pool)
        .await
        .map_err(|e| anyhow!("Failed to fetch subtitles: {}", e))?;

        Ok(subtitles)
    }

    pub async fn get_active_overlays(pool: &PgPool, movie_id: Uuid) -> Result<Vec<OverlayRow>> {
        let overlays = sqlx::query_as::<_, OverlayRow>(
            r#"
            SELECT id, kind, placement, starts_at, ends_at,
                   storage_key, external_url, html, href, opacity
            FROM sponsor_overlays
            WHERE movie_id = $1 AND active = TRUE
            ORDER BY position ASC
            "#,
        )
        .bind(movie_id)
        .fetch_all(pool)
        .await
        .map_err(|e| anyhow!("Failed to fetch overlays: {}", e))?;

        Ok(overlays)
    }
}
