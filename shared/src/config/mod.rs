//! Configuration module with one sub-module per concern:
//! - `auth` - token signing key and lifetimes
//! - `database` - Postgres connection and pool configuration
//! - `queue` - Redis-backed message queue configuration
//! - `identity` - upstream identity service configuration

pub mod auth;
pub mod database;
pub mod identity;
pub mod queue;

use serde::Deserialize;

pub use auth::TokenConfig;
pub use database::DatabaseConfig;
pub use identity::IdentityConfig;
pub use queue::QueueConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Token signing and lifetime configuration
    pub token: TokenConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Message queue configuration
    #[serde(default)]
    pub queue: QueueConfig,

    /// Upstream identity service configuration
    #[serde(default)]
    pub identity: IdentityConfig,
}

impl AppConfig {
    /// Load the complete configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            token: TokenConfig::from_env(),
            database: DatabaseConfig::from_env(),
            queue: QueueConfig::from_env(),
            identity: IdentityConfig::from_env(),
        }
    }
}

pub(crate) fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

pub(crate) fn env_or_string(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
