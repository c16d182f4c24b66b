//! One-time token persistence (verification and reset tokens).

pub mod mock;
mod r#trait;

pub use mock::MockOneTimeTokenRepository;
pub use r#trait::OneTimeTokenRepository;
