//! Value objects returned by the token lifecycle engine.

mod auth;

pub use auth::{IssuedToken, TokenIdentity, TokenPair};
