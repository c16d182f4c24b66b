//! Domain entities.

pub mod account;
pub mod message;
pub mod one_time;
pub mod role;
pub mod token;

pub use account::{Account, NewAccount};
pub use message::{MailMessage, SagaCompensation};
pub use one_time::OneTimeToken;
pub use role::{Role, TokenPurpose};
pub use token::{Claims, TokenRecord};
