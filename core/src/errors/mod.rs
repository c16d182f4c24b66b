//! Error taxonomy for the TokenGate core.
//!
//! Token validation failures deliberately collapse forged, revoked and
//! rotated tokens into the single [`TokenError::Invalid`] so that callers
//! cannot probe revocation state.

use thiserror::Error;

/// Bearer token validation and issuance errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, malformed claims, unknown role partition, or no
    /// matching live record. Intentionally indistinguishable.
    #[error("invalid token")]
    Invalid,

    #[error("token expired")]
    Expired,

    /// The token is genuine but carries the wrong purpose for the
    /// attempted operation.
    #[error("invalid token purpose")]
    WrongPurpose,

    #[error("token generation failed")]
    GenerationFailed,

    /// The generation-number allocator found no free slot despite the
    /// fast-path check failing: an internal-consistency violation.
    #[error("generation number allocation failed")]
    AllocationFailed,
}

/// Core errors shared across services
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed request; detected before any store access, never retried
    #[error("validation error: {message}")]
    Validation { message: String },

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("not found: {resource}")]
    NotFound { resource: String },

    #[error("already exists: {resource}")]
    AlreadyExists { resource: String },

    /// Account exists but has not completed email verification
    #[error("account is not verified")]
    NotVerified,

    /// The identity collaborator rejected a verification status update
    #[error("verification failed")]
    VerificationFailed,

    /// Transaction or store failure; the transaction was rolled back
    #[error("storage error: {message}")]
    System { message: String },

    /// Remote collaborator failure, annotated with its status
    #[error("upstream {collaborator} failure: {detail}")]
    Upstream { collaborator: String, detail: String },

    /// The operation deadline elapsed; any in-flight transaction was
    /// dropped and rolled back
    #[error("operation timed out")]
    Timeout,
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Shorthand for a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a storage error
    pub fn system(message: impl Into<String>) -> Self {
        CoreError::System {
            message: message.into(),
        }
    }

    /// Shorthand for an upstream collaborator error
    pub fn upstream(collaborator: impl Into<String>, detail: impl Into<String>) -> Self {
        CoreError::Upstream {
            collaborator: collaborator.into(),
            detail: detail.into(),
        }
    }
}
