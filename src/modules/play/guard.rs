use crate::common::error::ServiceError;
use crate::infrastructure::redis::client::RedisService;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use redis::AsyncCommands;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

/// Replay/rate hardening for issued grants.
///
/// Grant liveness lives in redis (the record expires with the grant);
/// heartbeat flooding is throttled per session with an in-process GCRA
/// limiter. Without redis, grant checks degrade to allow-all and only
/// the heartbeat limiter remains.
#[derive(Clone)]
pub struct ReplayGuard {
    redis: Option<RedisService>,
    enabled: bool,
    heartbeat_limiter: Arc<DefaultKeyedRateLimiter<String>>,
}

impl ReplayGuard {
    pub fn new(redis: Option<RedisService>, heartbeat_interval_seconds: i64, enabled: bool) -> Self {
        if enabled && redis.is_none() {
            warn!("replay guard running without redis: grant expiry checks disabled");
        }

        // Sustained rate of one heartbeat per half interval, burst of
        // two to absorb client timer jitter.
        let period = Duration::from_secs((heartbeat_interval_seconds.max(2) as u64) / 2);
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(nonzero!(1u32)))
            .allow_burst(nonzero!(2u32));

        Self {
            redis,
            enabled,
            heartbeat_limiter: Arc::new(RateLimiter::keyed(quota)),
        }
    }

    fn grant_key(grant_id: Uuid) -> String {
        format!("play:grant:{grant_id}")
    }

    fn first_use_key(grant_id: Uuid) -> String {
        format!("play:grant_used:{grant_id}")
    }

    /// Record a freshly issued grant. The key carries the grant ttl, so
    /// expiry needs no sweeper. Failures are logged: issuance must not
    /// depend on the guard store being up.
    pub async fn record_issue(&self, grant_id: Uuid, ttl_seconds: i64) {
        if !self.enabled {
            return;
        }
        let Some(redis) = &self.redis else { return };

        let result: redis::RedisResult<()> = async {
            let mut conn = redis.get_conn().await?;
            conn.set_ex(
                Self::grant_key(grant_id),
                OffsetDateTime::now_utc().unix_timestamp(),
                ttl_seconds.unsigned_abs(),
            )
            .await
        }
        .await;

        if let Err(e) = result {
            warn!("replay guard could not record grant {grant_id}: {e}");
        }
    }

    /// Deny use of a grant whose record has expired; remember first use
    /// for downstream reconciliation of "was this grant ever played".
    pub async fn check_grant(&self, grant_id: Uuid) -> Result<(), ServiceError> {
        if !self.enabled {
            return Ok(());
        }
        let Some(redis) = &self.redis else {
            return Ok(());
        };

        let result: redis::RedisResult<bool> = async {
            let mut conn = redis.get_conn().await?;

            // TTL is -2 for a missing key, -1 for a key with no expiry.
            let remaining: i64 = conn.ttl(Self::grant_key(grant_id)).await?;
            if remaining == -2 {
                return Ok(false);
            }

            let first_use: bool = conn
                .set_nx(
                    Self::first_use_key(grant_id),
                    OffsetDateTime::now_utc().unix_timestamp(),
                )
                .await?;
            if first_use {
                let _: bool = conn
                    .expire(
                        Self::first_use_key(grant_id),
                        if remaining > 0 { remaining } else { 60 },
                    )
                    .await?;
            }

            Ok(true)
        }
        .await;

        match result {
            Ok(true) => Ok(()),
            Ok(false) => Err(ServiceError::GrantExpired),
            Err(e) => {
                // Guard store outage fails open: hardening must not
                // block playback tracking.
                warn!("replay guard check unavailable for grant {grant_id}: {e}");
                Ok(())
            }
        }
    }

    /// Throttle heartbeat ingestion per session id.
    pub fn check_heartbeat(&self, session_id: &str) -> Result<(), ServiceError> {
        if !self.enabled {
            return Ok(());
        }

        self.heartbeat_limiter
            .check_key(&session_id.to_string())
            .map_err(|_| ServiceError::RateLimited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heartbeat_burst_is_capped() {
        let guard = ReplayGuard::new(None, 30, true);

        assert!(guard.check_heartbeat("s1").is_ok());
        assert!(guard.check_heartbeat("s1").is_ok());
        assert!(matches!(
            guard.check_heartbeat("s1"),
            Err(ServiceError::RateLimited)
        ));
    }

    #[test]
    fn sessions_are_throttled_independently() {
        let guard = ReplayGuard::new(None, 30, true);

        assert!(guard.check_heartbeat("s1").is_ok());
        assert!(guard.check_heartbeat("s1").is_ok());
        assert!(guard.check_heartbeat("s1").is_err());
        assert!(guard.check_heartbeat("s2").is_ok());
    }

    #[test]
    fn disabled_guard_allows_everything() {
        let guard = ReplayGuard::new(None, 30, false);

        for _ in 0..10 {
            assert!(guard.check_heartbeat("s1").is_ok());
        }
    }

    #[tokio::test]
    async fn grant_check_without_redis_fails_open() {
        let guard = ReplayGuard::new(None, 30, true);
        assert!(guard.check_grant(Uuid::new_v4()).await.is_ok());
    }
}
