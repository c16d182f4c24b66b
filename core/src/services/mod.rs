//! Business services.

pub mod account;
pub mod token;

pub use account::{AccountService, AccountServiceConfig};
pub use token::{SweeperConfig, TokenService, TokenServiceConfig, TokenSweeper};
