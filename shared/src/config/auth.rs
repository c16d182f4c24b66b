//! Token signing and lifetime configuration

use serde::Deserialize;

use super::{env_or, env_or_string};

/// Configuration for bearer token issuance and validation
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    /// Symmetric secret used to sign bearer tokens (HS256)
    pub secret: String,

    /// Access token lifetime in seconds
    pub access_token_expiry: i64,

    /// Refresh token lifetime in seconds
    pub refresh_token_expiry: i64,

    /// Deadline for a single engine operation, in milliseconds
    pub operation_timeout_ms: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::from("development-secret-please-change-in-production"),
            access_token_expiry: 900,      // 15 minutes
            refresh_token_expiry: 604_800, // 7 days
            operation_timeout_ms: 5_000,
        }
    }
}

impl TokenConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: env_or_string("TOKEN_SECRET", &defaults.secret),
            access_token_expiry: env_or("TOKEN_ACCESS_EXPIRY", defaults.access_token_expiry),
            refresh_token_expiry: env_or("TOKEN_REFRESH_EXPIRY", defaults.refresh_token_expiry),
            operation_timeout_ms: env_or("TOKEN_OPERATION_TIMEOUT_MS", defaults.operation_timeout_ms),
        }
    }

    /// Create a new configuration with an explicit secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token lifetime in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token lifetime in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86_400;
        self
    }

    /// Check if the default secret is still in use (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == Self::default().secret
    }
}
