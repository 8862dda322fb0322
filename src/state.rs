use crate::config::settings::AppConfig;
use crate::infrastructure::db::pool::DbPool;
use crate::infrastructure::queue::rabbitmq::RabbitMqService;
use crate::infrastructure::redis::client::RedisService;
use crate::infrastructure::storage::s3::StorageService;
use crate::modules::play::guard::ReplayGuard;
use crate::modules::track::sink::EventSink;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DbPool,
    pub redis: RedisService,
    pub storage: StorageService,
    pub queue: RabbitMqService,
    pub sink: EventSink,
    pub guard: ReplayGuard,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        db: DbPool,
        redis: RedisService,
        storage: StorageService,
        queue: RabbitMqService,
        sink: EventSink,
        guard: ReplayGuard,
    ) -> Self {
        Self {
            config,
            db,
            redis,
            storage,
            queue,
            sink,
            guard,
        }
    }
}
