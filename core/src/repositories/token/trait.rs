//! Token repository trait defining per-role partitioned token storage.

use async_trait::async_trait;

use crate::domain::entities::role::{Role, TokenPurpose};
use crate::domain::entities::token::TokenRecord;
use crate::errors::CoreResult;

/// Repository for issued token records, partitioned by role.
///
/// All operations are transaction-scoped: they run against a handle
/// obtained from [`crate::repositories::TransactionManager`] and take
/// effect only when the caller commits.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Transaction handle type, matching the paired transaction manager
    type Tx: Send;

    /// Return the smallest non-negative generation number not currently
    /// live for `(role, user_id)`. Empty partition yields `0`.
    async fn next_number(&self, tx: &mut Self::Tx, role: Role, user_id: &str) -> CoreResult<i64>;

    /// Insert one token record. Implementations must fail when the
    /// affected-row count differs from one.
    async fn insert(&self, tx: &mut Self::Tx, record: TokenRecord) -> CoreResult<TokenRecord>;

    /// Exact-match lookup of a live record. `Ok(None)` is the distinct
    /// not-found condition; callers decide how to report it.
    async fn find_matching(
        &self,
        tx: &mut Self::Tx,
        role: Role,
        user_id: &str,
        number: i64,
        purpose: TokenPurpose,
        secret: &str,
    ) -> CoreResult<Option<TokenRecord>>;

    /// Remove both purpose rows of one generation.
    async fn delete_generation(
        &self,
        tx: &mut Self::Tx,
        role: Role,
        user_id: &str,
        number: i64,
    ) -> CoreResult<()>;

    /// Remove every generation for a user within one role partition.
    async fn delete_all_for_user(
        &self,
        tx: &mut Self::Tx,
        role: Role,
        user_id: &str,
    ) -> CoreResult<()>;

    /// Delete, across all role partitions, every generation whose refresh
    /// row expired at or before `cutoff` (unix milliseconds). Both purpose
    /// rows of an affected generation are removed. Returns the number of
    /// rows deleted.
    async fn sweep_expired(&self, tx: &mut Self::Tx, cutoff: i64) -> CoreResult<u64>;
}
