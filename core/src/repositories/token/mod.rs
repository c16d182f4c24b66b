//! Token record persistence.

pub mod alloc;
pub mod mock;
mod r#trait;

pub use mock::MockTokenRepository;
pub use r#trait::TokenRepository;
