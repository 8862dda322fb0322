use super::model::ResolvedContent;
use super::repository::CatalogRepository;
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Content Lookup collaborator: the catalog itself is owned by the
/// platform backend, this service only reads it.
pub struct ContentLookup;

impl ContentLookup {
    pub async fn resolve(pool: &PgPool, content_id: Uuid) -> Result<Option<ResolvedContent>> {
        let Some(movie) = CatalogRepository::get_movie_by_id(pool, content_id).await? else {
            return Ok(None);
        };

        let sources = CatalogRepository::get_active_sources(pool, movie.id).await?;
        let subtitles = CatalogRepository::get_subtitles(pool, movie.id).await?;
        let overlays = CatalogRepository::get_active_overlays(pool, movie.id).await?;

        Ok(Some(ResolvedContent {
            movie,
            sources,
            subtitles,
            overlays,
        }))
    }
}
