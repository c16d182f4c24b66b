//! Background sweeping of expired token generations.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::repositories::{TokenRepository, TransactionManager};

use super::service::TokenService;

/// Configuration for the expiry sweeper.
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Interval between sweep runs
    pub interval: Duration,
    /// Whether the background task is enabled
    pub enabled: bool,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
            enabled: true,
        }
    }
}

/// Periodically deletes token generations whose refresh record has
/// expired. A generation only becomes garbage once its refresh token is
/// past its lifetime; until then the user could still rotate it.
pub struct TokenSweeper<T, R>
where
    T: TransactionManager + 'static,
    R: TokenRepository<Tx = T::Tx> + 'static,
{
    service: Arc<TokenService<T, R>>,
    config: SweeperConfig,
}

impl<T, R> TokenSweeper<T, R>
where
    T: TransactionManager + 'static,
    R: TokenRepository<Tx = T::Tx> + 'static,
{
    pub fn new(service: Arc<TokenService<T, R>>, config: SweeperConfig) -> Self {
        Self { service, config }
    }

    /// Runs a single sweep against the current instant.
    pub async fn run_once(&self) -> crate::errors::CoreResult<u64> {
        self.service
            .sweep_expired(Utc::now().timestamp_millis())
            .await
    }

    /// Spawns the periodic sweep task. Returns `None` when disabled.
    ///
    /// The first tick fires after one full interval; a fresh process has
    /// nothing urgent to sweep. Failures are logged and the loop keeps
    /// running.
    pub fn start_background_task(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            info!("token sweeper is disabled");
            return None;
        }

        let interval = self.config.interval;
        info!(interval_secs = interval.as_secs(), "starting token sweeper");

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                match self.run_once().await {
                    Ok(deleted) => {
                        if deleted > 0 {
                            info!(deleted, "token sweep completed");
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "token sweep failed");
                    }
                }
            }
        }))
    }
}
