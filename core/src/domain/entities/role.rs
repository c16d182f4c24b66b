//! Role and token purpose tags.

use serde::{Deserialize, Serialize};

/// Privilege role of an account.
///
/// Each role maps to its own token storage partition: a token issued for
/// one role can never be validated against another role's partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    StandardUser,
}

impl Role {
    /// All known roles, in tag order.
    pub const ALL: [Role; 2] = [Role::Admin, Role::StandardUser];

    /// Integer tag used on the wire and in stored rows.
    pub fn tag(self) -> i64 {
        match self {
            Role::Admin => 0,
            Role::StandardUser => 1,
        }
    }

    /// Resolve a wire tag back to a role. Unknown tags have no partition.
    pub fn from_tag(tag: i64) -> Option<Role> {
        match tag {
            0 => Some(Role::Admin),
            1 => Some(Role::StandardUser),
            _ => None,
        }
    }
}

/// Purpose of an issued token.
///
/// A login produces exactly one token of each purpose, sharing a
/// generation number. Access tokens authenticate regular requests;
/// refresh tokens may only mint a replacement generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenPurpose {
    Access,
    Refresh,
}

impl TokenPurpose {
    /// Integer tag used on the wire and in stored rows.
    pub fn tag(self) -> i64 {
        match self {
            TokenPurpose::Access => 0,
            TokenPurpose::Refresh => 1,
        }
    }

    /// Resolve a wire tag back to a purpose.
    pub fn from_tag(tag: i64) -> Option<TokenPurpose> {
        match tag {
            0 => Some(TokenPurpose::Access),
            1 => Some(TokenPurpose::Refresh),
            _ => None,
        }
    }
}
