//! Redis-backed outbound message publisher.

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::Serialize;
use tg_core::adapters::MessagePublisher;
use tg_core::domain::entities::message::{MailMessage, SagaCompensation};
use tg_core::errors::{CoreError, CoreResult};
use tg_shared::config::QueueConfig;
use tracing::debug;

const COLLABORATOR: &str = "queue";

/// [`MessagePublisher`] that LPUSHes JSON payloads onto named Redis
/// lists; the mail worker and the saga consumer BRPOP from the other
/// end.
pub struct RedisQueuePublisher {
    client: redis::Client,
    mail_queue: String,
    saga_queue: String,
}

impl RedisQueuePublisher {
    pub fn new(config: &QueueConfig) -> CoreResult<Self> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| CoreError::system(format!("queue client init failed: {e}")))?;

        Ok(Self {
            client,
            mail_queue: config.mail_queue.clone(),
            saga_queue: config.saga_queue.clone(),
        })
    }

    async fn push<T: Serialize>(&self, queue: &str, payload: &T) -> CoreResult<()> {
        let body = serde_json::to_string(payload)
            .map_err(|e| CoreError::system(format!("payload serialization failed: {e}")))?;

        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CoreError::upstream(COLLABORATOR, e.to_string()))?;
        conn.lpush::<_, _, ()>(queue, body)
            .await
            .map_err(|e| CoreError::upstream(COLLABORATOR, e.to_string()))?;

        debug!(queue, "message published");
        Ok(())
    }
}

#[async_trait]
impl MessagePublisher for RedisQueuePublisher {
    async fn publish_mail(&self, message: &MailMessage) -> CoreResult<()> {
        self.push(&self.mail_queue, message).await
    }

    async fn publish_compensation(&self, message: &SagaCompensation) -> CoreResult<()> {
        self.push(&self.saga_queue, message).await
    }
}
