//! Account flows: login, registration, email verification, password
//! reset and logout. Credential storage itself lives upstream; this
//! module orchestrates the identity collaborator, one-time tokens, the
//! token engine and the outbound mail queue.

mod config;
mod service;
mod types;


pub use config::AccountServiceConfig;
pub use service::AccountService;
pub use types::{LoginResponse, RegisterRequest};
