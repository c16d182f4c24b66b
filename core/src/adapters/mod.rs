//! Traits for the service's external collaborators.

mod identity;
mod queue;

pub use identity::IdentityAdapter;
pub use queue::MessagePublisher;
