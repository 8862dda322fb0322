use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    DatabaseUrl,
    RedisUrl,
    AmqpUrl,
    MinioUrl,
    MinioBucket,
    MinioAccessKey,
    MinioSecretKey,
    JwtSecret,
    GrantTtlSeconds,
    GrantMaxTtlSeconds,
    HeartbeatIntervalSeconds,
    SweepIntervalSeconds,
    SweepLookbackSeconds,
    ReplayGuardEnabled,
    SinkQueueCapacity,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::DatabaseUrl => "DATABASE_URL",
            EnvKey::RedisUrl => "REDIS_URL",
            EnvKey::AmqpUrl => "AMQP_URL",
            EnvKey::MinioUrl => "MINIO_ENDPOINT",
            EnvKey::MinioBucket => "MINIO_BUCKET_MEDIA",
            EnvKey::MinioAccessKey => "AWS_ACCESS_KEY_ID",
            EnvKey::MinioSecretKey => "AWS_SECRET_ACCESS_KEY",
            EnvKey::JwtSecret => "JWT_SECRET",
            EnvKey::GrantTtlSeconds => "PLAY_GRANT_TTL_SECONDS",
            EnvKey::GrantMaxTtlSeconds => "PLAY_GRANT_MAX_TTL_SECONDS",
            EnvKey::HeartbeatIntervalSeconds => "PLAY_HEARTBEAT_INTERVAL_SECONDS",
            EnvKey::SweepIntervalSeconds => "SESSION_SWEEP_INTERVAL_SECONDS",
            EnvKey::SweepLookbackSeconds => "SESSION_SWEEP_LOOKBACK_SECONDS",
            EnvKey::ReplayGuardEnabled => "REPLAY_GUARD_ENABLED",
            EnvKey::SinkQueueCapacity => "TRACK_SINK_QUEUE_CAPACITY",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
