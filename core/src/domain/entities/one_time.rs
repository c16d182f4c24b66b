//! One-time tokens for email verification and password reset.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single-use, short-lived token row.
///
/// The raw token value is sent to the user out of band; only its bcrypt
/// hash is stored. Consuming the token deletes the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneTimeToken {
    pub id: Uuid,
    pub user_id: String,
    pub token_hash: String,
    /// Creation instant in unix seconds
    pub created_at: i64,
    /// Expiry instant in unix seconds
    pub expires_at: i64,
}

impl OneTimeToken {
    /// Whether the token has passed its expiry at the given instant.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at < now
    }
}
