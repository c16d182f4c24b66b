//! Request/response payloads for the account flows.

use serde::{Deserialize, Serialize};

use crate::domain::entities::account::Account;
use crate::domain::value_objects::TokenPair;

/// Registration input. The raw password never leaves this process; only
/// its bcrypt hash is sent upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub firstname: String,
    pub lastname: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Successful login: the verified account plus a fresh token generation.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub account: Account,
    pub tokens: TokenPair,
}
