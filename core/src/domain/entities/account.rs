//! Account entity owned by the upstream identity service.

use serde::{Deserialize, Serialize};

use super::role::Role;

/// An account as reported by the identity collaborator.
///
/// The engine never persists or mutates this entity; it is fetched
/// through [`crate::adapters::IdentityAdapter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub role: Role,
    pub email: String,
    pub firstname: String,
    pub verified: bool,
}

/// Payload for creating an account upstream during registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    /// bcrypt hash, never the raw password
    pub password_hash: String,
}
