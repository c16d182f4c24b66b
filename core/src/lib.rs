//! # TokenGate Core
//!
//! Core business logic and domain layer for the TokenGate service.
//! This crate contains the domain entities, the token lifecycle engine,
//! repository and collaborator interfaces, and error types.

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    Account, Claims, MailMessage, NewAccount, OneTimeToken, Role, SagaCompensation, TokenPurpose,
    TokenRecord,
};
pub use domain::value_objects::{IssuedToken, TokenIdentity, TokenPair};
pub use errors::{CoreError, CoreResult, TokenError};
pub use repositories::{OneTimeTokenRepository, TokenRepository, TransactionManager};
pub use services::account::{LoginResponse, RegisterRequest};
pub use services::{
    AccountService, AccountServiceConfig, SweeperConfig, TokenService, TokenServiceConfig,
    TokenSweeper,
};
