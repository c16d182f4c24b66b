//! Token record and bearer claims.

use serde::{Deserialize, Serialize};

use super::role::{Role, TokenPurpose};

/// Persisted token row.
///
/// One generation consists of two records sharing a `number`: one with
/// purpose `Access` and one with purpose `Refresh`. The `secret` is a
/// per-record high-entropy value embedded in the bearer token as well;
/// deleting the row instantly revokes the outstanding bearer token even
/// before its encoded expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Account this record belongs to
    pub user_id: String,

    /// Role partition the record lives in
    pub role: Role,

    /// Generation number, scoped to (role, user)
    pub number: i64,

    /// Access or refresh
    pub purpose: TokenPurpose,

    /// Per-record opaque secret, never reused across records
    pub secret: String,

    /// Expiry instant in unix milliseconds
    pub expires_at: i64,
}

/// JWT claims carried by a bearer token.
///
/// The token is self-describing: the signature alone proves authenticity,
/// but validation still requires an exact-match lookup of the embedded
/// fields against a live [`TokenRecord`], which is what makes the token
/// revocable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Role tag (see [`Role::tag`])
    pub role: i64,

    /// Purpose tag (0 = access, 1 = refresh)
    pub purpose: i64,

    /// Per-record secret, must match the stored row
    pub secret: String,

    /// Generation number
    pub number: i64,

    /// Expiry in unix seconds
    pub exp: i64,
}
