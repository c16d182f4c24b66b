//! Postgres transaction manager.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tg_core::errors::CoreResult;
use tg_core::repositories::TransactionManager;

use super::db_error;

/// [`TransactionManager`] over a shared Postgres pool.
///
/// The handle is a plain `sqlx::Transaction`; dropping it without a
/// commit rolls the unit of work back, which is exactly the contract the
/// core relies on for its early-return error paths.
pub struct PgTransactionManager {
    pool: PgPool,
}

impl PgTransactionManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManager for PgTransactionManager {
    type Tx = Transaction<'static, Postgres>;

    async fn begin(&self) -> CoreResult<Self::Tx> {
        self.pool.begin().await.map_err(db_error)
    }

    async fn commit(&self, tx: Self::Tx) -> CoreResult<()> {
        tx.commit().await.map_err(db_error)
    }

    async fn rollback(&self, tx: Self::Tx) -> CoreResult<()> {
        tx.rollback().await.map_err(db_error)
    }
}
