//! One-time token repository trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::one_time::OneTimeToken;
use crate::errors::CoreResult;

/// Storage for single-use verification/reset tokens.
///
/// The same contract backs both the verification and the reset table; an
/// implementation instance is bound to one of them.
#[async_trait]
pub trait OneTimeTokenRepository: Send + Sync {
    /// Transaction handle type, matching the paired transaction manager
    type Tx: Send;

    /// Persist a new token row.
    async fn create(&self, tx: &mut Self::Tx, token: OneTimeToken) -> CoreResult<OneTimeToken>;

    /// Fetch a token row by id. `Ok(None)` when absent.
    async fn get_by_id(&self, tx: &mut Self::Tx, id: Uuid) -> CoreResult<Option<OneTimeToken>>;

    /// Delete a token row (consume it).
    async fn delete_by_id(&self, tx: &mut Self::Tx, id: Uuid) -> CoreResult<()>;
}
