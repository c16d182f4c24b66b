//! Configuration for the token lifecycle engine.

use std::time::Duration;

use tg_shared::config::TokenConfig;

/// Configuration for [`super::TokenService`]
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// HS256 signing secret
    pub secret: String,
    /// Access token lifetime in seconds
    pub access_token_expiry: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_expiry: i64,
    /// Deadline for one engine operation
    pub operation_timeout: Duration,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self::from(&TokenConfig::default())
    }
}

impl From<&TokenConfig> for TokenServiceConfig {
    fn from(cfg: &TokenConfig) -> Self {
        Self {
            secret: cfg.secret.clone(),
            access_token_expiry: cfg.access_token_expiry,
            refresh_token_expiry: cfg.refresh_token_expiry,
            operation_timeout: Duration::from_millis(cfg.operation_timeout_ms),
        }
    }
}
