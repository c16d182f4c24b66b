//! Transaction coordination.

use async_trait::async_trait;

use crate::errors::{CoreError, CoreResult};

/// Opens and finishes atomic units of work against the relational store.
///
/// Every engine write path begins a transaction, performs its repository
/// calls against the handle, and commits explicitly. Implementations must
/// roll an uncommitted handle back when it is dropped, so that every early
/// error return leaves no partial write behind.
#[async_trait]
pub trait TransactionManager: Send + Sync {
    /// Transaction handle passed to transaction-scoped repository calls
    type Tx: Send;

    /// Start a transaction. Failure here is fatal to the calling
    /// operation and is surfaced, not retried.
    async fn begin(&self) -> CoreResult<Self::Tx>;

    /// Commit the unit of work.
    async fn commit(&self, tx: Self::Tx) -> CoreResult<()>;

    /// Roll the unit of work back explicitly. Dropping the handle has the
    /// same effect; this exists for callers that want the error.
    async fn rollback(&self, tx: Self::Tx) -> CoreResult<()>;
}

/// No-op transaction manager for tests against in-memory repositories.
///
/// The in-memory mocks apply writes immediately, so the handle carries no
/// state.
#[derive(Debug, Default)]
pub struct MockTransactionManager;

impl MockTransactionManager {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransactionManager for MockTransactionManager {
    type Tx = ();

    async fn begin(&self) -> CoreResult<()> {
        Ok(())
    }

    async fn commit(&self, _tx: ()) -> CoreResult<()> {
        Ok(())
    }

    async fn rollback(&self, _tx: ()) -> CoreResult<()> {
        Ok(())
    }
}

/// Transaction manager whose `begin` always fails; used to exercise the
/// engine's fatal-transaction-start path in tests.
#[derive(Debug, Default)]
pub struct FailingTransactionManager;

#[async_trait]
impl TransactionManager for FailingTransactionManager {
    type Tx = ();

    async fn begin(&self) -> CoreResult<()> {
        Err(CoreError::system("transaction start refused"))
    }

    async fn commit(&self, _tx: ()) -> CoreResult<()> {
        Err(CoreError::system("no transaction"))
    }

    async fn rollback(&self, _tx: ()) -> CoreResult<()> {
        Err(CoreError::system("no transaction"))
    }
}
