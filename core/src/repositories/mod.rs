//! Repository interfaces and their in-memory test doubles.

pub mod one_time;
pub mod token;
pub mod transaction;

pub use one_time::{MockOneTimeTokenRepository, OneTimeTokenRepository};
pub use token::{MockTokenRepository, TokenRepository};
pub use transaction::{FailingTransactionManager, MockTransactionManager, TransactionManager};
