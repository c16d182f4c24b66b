//! Outbound message queue contract.

use async_trait::async_trait;

use crate::domain::entities::message::{MailMessage, SagaCompensation};
use crate::errors::CoreResult;

/// Fire-and-forget publisher for outbound messages.
///
/// Publishing is fire-and-forget on the consumer side, but a failed
/// publish must surface to the caller: the registration and reset flows
/// treat a lost mail message as a hard error requiring compensation.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Enqueue an addressed mail message.
    async fn publish_mail(&self, message: &MailMessage) -> CoreResult<()>;

    /// Enqueue a saga compensation message so an already-performed
    /// upstream mutation can be rolled back asynchronously.
    async fn publish_compensation(&self, message: &SagaCompensation) -> CoreResult<()>;
}
