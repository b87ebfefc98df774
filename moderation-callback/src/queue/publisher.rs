//! Async RabbitMQ publisher for enqueueing messages.
//!
//! A single lazily-opened connection and channel, shared by every dispatch
//! task and re-established when the broker drops it.

use std::sync::Arc;

use anyhow::{Context, Result};
use lapin::{
    options::{BasicPublishOptions, QueueDeclareOptions},
    types::FieldTable,
    BasicProperties, Channel, Connection, ConnectionProperties,
};
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::types::{ModerationJob, MODERATION_QUEUE};

/// Cheaply cloneable RabbitMQ publisher.
#[derive(Clone)]
pub struct Publisher {
    inner: Arc<PublisherInner>,
}

struct PublisherInner {
    url: String,
    connection: RwLock<Option<Connection>>,
    channel: RwLock<Option<Channel>>,
}

impl Publisher {
    /// Create a new publisher with the given RabbitMQ URL.
    pub fn new(url: String) -> Self {
        Self {
            inner: Arc::new(PublisherInner {
                url,
                connection: RwLock::new(None),
                channel: RwLock::new(None),
            }),
        }
    }

    /// Return the open channel, connecting first if there is none or the
    /// broker dropped it.
    async fn ensure_connected(&self) -> Result<Channel> {
        if let Some(ch) = live_channel(&*self.inner.channel.read().await) {
            return Ok(ch);
        }

        let mut connection = self.inner.connection.write().await;
        let mut channel = self.inner.channel.write().await;

        // Another task may have reconnected while we waited
        if let Some(ch) = live_channel(&channel) {
            return Ok(ch);
        }

        info!("rabbitmq_publisher_connecting");

        let conn = Connection::connect(&self.inner.url, ConnectionProperties::default())
            .await
            .context("Failed to connect to RabbitMQ")?;
        let ch = conn
            .create_channel()
            .await
            .context("Failed to create channel")?;

        info!("rabbitmq_publisher_connected");

        // Declare the queue (idempotent operation)
        ch.queue_declare(
            MODERATION_QUEUE,
            QueueDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await
        .context("Failed to declare moderation queue")?;

        info!(queue = MODERATION_QUEUE, "rabbitmq_queue_declared");

        *connection = Some(conn);
        *channel = Some(ch.clone());

        Ok(ch)
    }

    /// Publish a moderation job to the moderation_actions queue.
    pub async fn publish_job(&self, job: &ModerationJob) -> Result<()> {
        let channel = self.ensure_connected().await?;

        let body = serde_json::to_vec(job).context("Failed to serialize job")?;
        let message_id = job.message_id();

        channel
            .basic_publish(
                "",
                MODERATION_QUEUE,
                BasicPublishOptions::default(),
                &body,
                BasicProperties::default()
                    .with_delivery_mode(2) // Persistent
                    .with_content_type("application/json".into())
                    .with_message_id(message_id.clone().into()),
            )
            .await
            .context("Failed to publish to moderation queue")?
            .await
            .context("Failed to confirm publish")?;

        info!(
            queue = MODERATION_QUEUE,
            message_id = %message_id,
            body_length = body.len(),
            "rabbitmq_job_published"
        );

        Ok(())
    }

    /// Close the connection gracefully.
    pub async fn close(&self) {
        let mut connection = self.inner.connection.write().await;
        let mut channel = self.inner.channel.write().await;

        if let Some(ch) = channel.take() {
            if let Err(e) = ch.close(200, "Normal shutdown").await {
                warn!(error = %e, "rabbitmq_channel_close_error");
            }
        }

        if let Some(conn) = connection.take() {
            if let Err(e) = conn.close(200, "Normal shutdown").await {
                warn!(error = %e, "rabbitmq_connection_close_error");
            }
        }

        info!("rabbitmq_publisher_closed");
    }
}

fn live_channel(channel: &Option<Channel>) -> Option<Channel> {
    channel
        .as_ref()
        .filter(|ch| ch.status().connected())
        .cloned()
}
