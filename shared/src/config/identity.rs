//! Upstream identity service configuration

use serde::Deserialize;

use super::{env_or, env_or_string};

/// Configuration for the upstream identity (account) service
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Base URL of the identity service
    pub base_url: String,

    /// Per-call deadline in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("http://localhost:8081"),
            request_timeout_ms: 3_000,
        }
    }
}

impl IdentityConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env_or_string("IDENTITY_BASE_URL", &defaults.base_url),
            request_timeout_ms: env_or("IDENTITY_TIMEOUT_MS", defaults.request_timeout_ms),
        }
    }
}
