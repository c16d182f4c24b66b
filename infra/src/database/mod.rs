//! Postgres implementations of the core storage contracts.

mod one_time_repository;
mod token_repository;
mod transaction;

pub use one_time_repository::PgOneTimeTokenRepository;
pub use token_repository::PgTokenRepository;
pub use transaction::PgTransactionManager;

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tg_core::errors::{CoreError, CoreResult};
use tg_shared::config::DatabaseConfig;
use tracing::info;

/// Opens the connection pool described by `config`.
pub async fn connect_pool(config: &DatabaseConfig) -> CoreResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout))
        .idle_timeout(Duration::from_secs(config.idle_timeout))
        .connect(&config.url)
        .await
        .map_err(db_error)?;

    info!(max_connections = config.max_connections, "database pool ready");
    Ok(pool)
}

/// Uniform mapping of sqlx failures onto the core's storage error.
pub(crate) fn db_error(e: sqlx::Error) -> CoreError {
    CoreError::system(format!("database error: {e}"))
}
