//! Configuration for the account service.

use std::time::Duration;

/// Configuration for [`super::AccountService`]
#[derive(Debug, Clone)]
pub struct AccountServiceConfig {
    /// Lifetime of an email verification token
    pub verification_token_ttl: Duration,
    /// Lifetime of a password reset token
    pub reset_token_ttl: Duration,
    /// bcrypt work factor for passwords and one-time tokens
    pub bcrypt_cost: u32,
}

impl Default for AccountServiceConfig {
    fn default() -> Self {
        Self {
            verification_token_ttl: Duration::from_secs(10 * 60),
            reset_token_ttl: Duration::from_secs(15 * 60),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl AccountServiceConfig {
    /// Lowered work factor for tests; never use in production.
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }
}
