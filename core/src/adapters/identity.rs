//! Upstream identity (account) service contract.

use async_trait::async_trait;

use crate::domain::entities::account::{Account, NewAccount};
use crate::errors::CoreResult;

/// Synchronous RPC contract of the upstream identity store.
///
/// Implementations must map a remote "not found" to
/// [`crate::errors::CoreError::NotFound`], a remote "already exists" to
/// [`crate::errors::CoreError::AlreadyExists`], and any other failure to
/// [`crate::errors::CoreError::Upstream`] annotated with the remote
/// status. Every call runs under a per-call deadline taken from
/// configuration.
#[async_trait]
pub trait IdentityAdapter: Send + Sync {
    async fn get_by_email(&self, email: &str) -> CoreResult<Account>;

    async fn get_by_login(&self, login: &str) -> CoreResult<Account>;

    async fn get_by_id(&self, id: &str) -> CoreResult<Account>;

    /// Create an account upstream; returns the created account.
    async fn create_account(&self, account: NewAccount) -> CoreResult<Account>;

    /// Mark an account's email as verified. Returns whether the remote
    /// accepted the update.
    async fn update_verification_status(&self, id: &str, email: &str) -> CoreResult<bool>;

    /// Replace the account's password hash. Returns the account id.
    async fn reset_password(&self, id: &str, password_hash: &str) -> CoreResult<String>;
}
