use super::model::{NewTrackEvent, StoredTrackEvent};
use anyhow::{Result, anyhow};
use sqlx::PgPool;
use time::OffsetDateTime;

pub struct TrackRepository;

impl TrackRepository {
    /// Append one event. The table is append-only; nothing in this
    /// service updates or deletes rows.
    pub async fn insert(pool: &PgPool, event: &NewTrackEvent) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO track_events
                (event_type, client_ts, server_ts, session_id, movie_id,
                 user_id, path, ip, user_agent, meta)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(event.event_type.as_str())
        .bind(event.client_ts)
        .bind(event.server_ts)
        .bind(&event.session_id)
        .bind(event.movie_id)
        .bind(event.user_id)
        .bind(&event.path)
        .bind(&event.ip)
        .bind(&event.user_agent)
        .bind(&event.meta)
        .execute(pool)
        .await
        .map_err(|e| anyhow!("Failed to insert track event: {}", e))?;

        Ok(())
    }

    /// All events for one session, ordered by server time — the only
    /// ordering reconciliation trusts.
    pub async fn find_by_session(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<Vec<StoredTrackEvent>> {
        let events = sqlx::query_as::<_, StoredTrackEvent>(
            r#"
            SELECT id, event_type, client_ts, server_ts, session_id,
                   movie_id, user_id, path, ip, user_agent, meta
            FROM track_events
            WHERE session_id = $1
            ORDER BY server_ts ASC, id ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(pool)
        .await
        .map_err(|e| anyhow!("Failed to fetch session events: {}", e))?;

        Ok(events)
    }

    /// Session ids whose last event falls inside (floor, cutoff]:
    /// quiet long enough to be candidates for abandonment, recent
    /// enough to still be worth sweeping.
    pub async fn stale_sessions(
        pool: &PgPool,
        cutoff: OffsetDateTime,
        floor: OffsetDateTime,
        limit: i64,
    ) -> Result<Vec<String>> {
        let sessions = sqlx::query_scalar::<_, String>(
            r#"
            SELECT session_id
            FROM track_events
            WHERE session_id IS NOT NULL
            GROUP BY session_id
            HAVING MAX(server_ts) <= $1 AND MAX(server_ts) > $2
            ORDER BY MAX(server_ts) ASC
            LIMIT $3
            "#,
        )
        .bind(cutoff)
        .bind(floor)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(|e| anyhow!("Failed to list stale sessions: {}", e))?;

        Ok(sessions)
    }
}
