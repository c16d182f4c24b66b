//! Token lifecycle engine.
//!
//! This module owns the full life of a bearer token pair:
//! - issuance of access/refresh generations with number allocation
//! - signature + live-record validation
//! - rotation on refresh
//! - revocation (single generation and user-wide)
//! - periodic sweeping of expired generations

mod config;
mod locks;
mod service;
mod sweeper;

#[cfg(test)]
mod tests;

pub use config::TokenServiceConfig;
pub use service::TokenService;
pub use sweeper::{SweeperConfig, TokenSweeper};
