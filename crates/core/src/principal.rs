use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{Role, SubjectId};

/// What the login collaborator hands over once it has checked credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub subject_id: SubjectId,
    pub role: Role,
    pub email: String,
    pub display_name: String,
}

/// The authenticated actor as carried inside a session token.
///
/// Immutable once encoded: a role or profile change means minting a new
/// token, never patching an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub subject_id: SubjectId,
    pub role: Role,
    pub email: String,
    pub display_name: String,
    /// Unix seconds at creation. Auditing only; expiry is the cookie's job.
    pub issued_at: i64,
}

impl Principal {
    /// Stamp an identity with its issue time.
    pub fn issue(identity: Identity, issued_at: i64) -> Self {
        Self {
            subject_id: identity.subject_id,
            role: identity.role,
            email: identity.email,
            display_name: identity.display_name,
            issued_at,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            subject_id: self.subject_id.clone(),
            role: self.role,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }

    /// Seconds elapsed since issue, clamped at zero for clock skew.
    pub fn age_secs(&self, now: i64) -> i64 {
        (now - self.issued_at).max(0)
    }
}

/// Current Unix time in seconds.
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}
