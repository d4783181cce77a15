//! Strongly-typed identifiers carried inside a session.

use core::str::FromStr;
use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

/// Identifier of the authenticated actor.
///
/// Opaque to this crate: the login collaborator decides what goes in here
/// (a database key, a UUID, an external IdP subject). The only rule is that
/// it round-trips through the token unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SubjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SubjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<SubjectId> for String {
    fn from(value: SubjectId) -> Self {
        value.0
    }
}

impl Borrow<str> for SubjectId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for SubjectId {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_plain_string() {
        let id = SubjectId::new("user-42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"user-42\"");
        let back: SubjectId = serde_json::from_str("\"user-42\"").unwrap();
        assert_eq!(back, id);
    }
}
