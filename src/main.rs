use dotenvy::dotenv;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod common;
mod config;
mod docs;
mod infrastructure;
mod middleware;
mod modules;
mod routes;
mod state;
mod workers;

use config::settings::AppConfig;
use infrastructure::db::pool::connect_to_db;
use infrastructure::queue::rabbitmq::RabbitMqService;
use infrastructure::redis::client::RedisService;
use infrastructure::storage::s3::StorageService;
use modules::play::guard::ReplayGuard;
use modules::track::sink::{EventSink, run_sink_worker};
use state::AppState;
use workers::sweeper::start_session_sweeper;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting playback service...");

    let config = AppConfig::new()?;

    let db = connect_to_db(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let redis = RedisService::new(&config.redis_url).await?;
    let storage = StorageService::new(
        &config.minio_url,
        &config.minio_bucket,
        &config.minio_access_key,
        &config.minio_secret_key,
    )
    .await;
    let queue = RabbitMqService::new(&config.amqp_url).await?;

    let (sink, sink_rx) = EventSink::new(config.sink_queue_capacity);
    let guard = ReplayGuard::new(
        Some(redis.clone()),
        config.heartbeat_interval_seconds,
        config.replay_guard_enabled,
    );

    let server_port = config.server_port;
    let state = AppState::new(config, db, redis, storage, queue, sink, guard);

    tokio::spawn(run_sink_worker(state.clone(), sink_rx));
    tokio::spawn(start_session_sweeper(state.clone()));

    let app = app::create_app(state).await;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", server_port)).await?;
    info!("Server running on http://0.0.0.0:{}", server_port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
