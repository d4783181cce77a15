use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role identifier used for RBAC.
///
/// The set is closed: a token naming anything outside it is not a session.
/// Exactly one role, [`Role::SuperAdmin`], bypasses every policy check.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    Admin,
    Editor,
    Member,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    /// Every role, most privileged first.
    pub const ALL: [Role; 4] = [Role::SuperAdmin, Role::Admin, Role::Editor, Role::Member];

    /// The role that implicitly satisfies every policy.
    pub const SUPER: Role = Role::SuperAdmin;

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::Editor => "EDITOR",
            Role::Member => "MEMBER",
        }
    }

    pub fn is_super(&self) -> bool {
        *self == Self::SUPER
    }

    /// Position in [`Role::ALL`]; stable, used for compact role sets.
    pub fn ordinal(&self) -> u8 {
        match self {
            Role::SuperAdmin => 0,
            Role::Admin => 1,
            Role::Editor => 2,
            Role::Member => 3,
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    /// Exact, case-sensitive match against the wire names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
