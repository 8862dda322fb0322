use serde::Deserialize;
use crate::config::env::{self, EnvKey};

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub database_url: String,
    pub redis_url: String,
    pub amqp_url: String,
    pub minio_url: String,
    pub minio_bucket: String,
    pub minio_access_key: String,
    pub minio_secret_key: String,
    pub jwt_secret: String,
    /// Default grant lifetime when the client does not ask for one.
    pub grant_ttl_seconds: i64,
    /// Hard cap on requested grant lifetimes.
    pub grant_max_ttl_seconds: i64,
    /// Advisory client ping interval; abandonment timeout is twice this.
    pub heartbeat_interval_seconds: i64,
    pub sweep_interval_seconds: u64,
    pub sweep_lookback_seconds: i64,
    pub replay_guard_enabled: bool,
    pub sink_queue_capacity: usize,
}

impl AppConfig {
    pub fn new() -> Result<Self, std::env::VarError> {
        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            database_url: env::get(EnvKey::DatabaseUrl)?,
            redis_url: env::get(EnvKey::RedisUrl)?,
            amqp_url: env::get(EnvKey::AmqpUrl)?,
            minio_url: env::get(EnvKey::MinioUrl)?,
            minio_bucket: env::get(EnvKey::MinioBucket)?,
            minio_access_key: env::get(EnvKey::MinioAccessKey)?,
            minio_secret_key: env::get(EnvKey::MinioSecretKey)?,
            jwt_secret: env::get(EnvKey::JwtSecret)?,
            grant_ttl_seconds: env::get_parsed(EnvKey::GrantTtlSeconds, 900),
            grant_max_ttl_seconds: env::get_parsed(EnvKey::GrantMaxTtlSeconds, 3600),
            heartbeat_interval_seconds: env::get_parsed(EnvKey::HeartbeatIntervalSeconds, 30),
            sweep_interval_seconds: env::get_parsed(EnvKey::SweepIntervalSeconds, 300),
            sweep_lookback_seconds: env::get_parsed(EnvKey::SweepLookbackSeconds, 86400),
            replay_guard_enabled: env::get_parsed(EnvKey::ReplayGuardEnabled, true),
            sink_queue_capacity: env::get_parsed(EnvKey::SinkQueueCapacity, 1024),
        })
    }

    /// Window after which a session with no activity counts as abandoned.
    pub fn abandonment_timeout_seconds(&self) -> i64 {
        2 * self.heartbeat_interval_seconds
    }
}
