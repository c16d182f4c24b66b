//! # Infrastructure Layer
//!
//! Concrete implementations of the core's storage and collaborator
//! contracts:
//! - **database**: Postgres repositories and transaction manager (sqlx)
//! - **identity**: HTTP client for the upstream identity service (reqwest)
//! - **queue**: Redis list publisher for outbound messages

pub mod database;
pub mod identity;
pub mod queue;

pub use database::{connect_pool, PgOneTimeTokenRepository, PgTokenRepository, PgTransactionManager};
pub use identity::HttpIdentityClient;
pub use queue::RedisQueuePublisher;
