//! Message queue configuration

use serde::Deserialize;

use super::env_or_string;

/// Configuration for the Redis-backed outbound message queue
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Redis connection URL
    pub url: String,

    /// Queue for outbound mail messages
    pub mail_queue: String,

    /// Queue for saga compensation messages
    pub saga_queue: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379"),
            mail_queue: String::from("mail_outbox"),
            saga_queue: String::from("user_saga"),
        }
    }
}

impl QueueConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: env_or_string("QUEUE_REDIS_URL", &defaults.url),
            mail_queue: env_or_string("QUEUE_MAIL_NAME", &defaults.mail_queue),
            saga_queue: env_or_string("QUEUE_SAGA_NAME", &defaults.saga_queue),
        }
    }
}
