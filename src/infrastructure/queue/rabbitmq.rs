use anyhow::{Result, anyhow};
use lapin::{
    BasicProperties, Channel, Connection, ConnectionProperties, options::*,
    types::FieldTable,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Publisher for the analytics warehouse hand-off.
///
/// Messages are published persistent to durable queues; a dropped
/// connection is re-established once per publish attempt.
#[derive(Clone)]
pub struct RabbitMqService {
    url: String,
    channel: Arc<Mutex<Channel>>,
}

impl RabbitMqService {
    async fn open_channel(url: &str) -> Result<Channel> {
        info!("Connecting to RabbitMQ at {}", url);
        let conn = Connection::connect(url, ConnectionProperties::default())
            .await
            .map_err(|e| anyhow!("Failed to connect to RabbitMQ: {}", e))?;

        let channel = conn
            .create_channel()
            .await
            .map_err(|e| anyhow!("Failed to create channel: {}", e))?;

        info!("Connected to RabbitMQ");
        Ok(channel)
    }

    pub async fn new(url: &str) -> Result<Self> {
        let channel = Self::open_channel(url).await?;

        Ok(Self {
            url: url.to_string(),
            channel: Arc::new(Mutex::new(channel)),
        })
    }

    async fn publish_on(channel: &Channel, queue: &str, payload: &[u8]) -> Result<()> {
        channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    durable: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| anyhow!("Failed to declare queue: {}", e))?;

        channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default().with_delivery_mode(2), // Persistent
            )
            .await
            .map_err(|e| anyhow!("Failed to publish message: {}", e))?
            .await
            .map_err(|e| anyhow!("Failed to confirm publication: {}", e))?;

        Ok(())
    }

    pub async fn publish(&self, queue: &str, payload: &[u8]) -> Result<()> {
        let mut guard = self.channel.lock().await;

        if let Err(e) = Self::publish_on(&guard, queue, payload).await {
            warn!("RabbitMQ publish failed: {}. Retrying after reconnect.", e);
            *guard = Self::open_channel(&self.url).await?;
            Self::publish_on(&guard, queue, payload).await?;
        }

        Ok(())
    }
}
