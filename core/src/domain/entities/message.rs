//! Outbound queue message payloads.

use serde::{Deserialize, Serialize};

/// Addressed mail message handed to the queue collaborator.
///
/// Composition/rendering of the final email happens downstream; this is
/// only the addressed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Compensation message published when a registration flow fails after
/// the upstream account was already created. The consumer rolls the
/// account back asynchronously.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SagaCompensation {
    pub user_id: String,
}
