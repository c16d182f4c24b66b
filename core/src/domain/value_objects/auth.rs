//! Authentication result value objects.

use serde::{Deserialize, Serialize};

use crate::domain::entities::role::Role;

/// The identity proven by a successfully authenticated bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenIdentity {
    pub user_id: String,
    pub role: Role,
}

/// A minted bearer token in wire form, with its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    /// Signed JWT
    pub token: String,
    /// Expiry instant in unix milliseconds
    pub expires_at: i64,
}

/// An access/refresh pair sharing one generation number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}
