use serde_json::{Map, Value};
use thiserror::Error;

use crate::{Principal, RejectReason, Role, SubjectId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("payload is not valid JSON")]
    NotJson,

    #[error("payload is not a JSON object")]
    NotObject,

    #[error("missing claim '{0}'")]
    Missing(&'static str),

    #[error("claim '{0}' is not a string")]
    NotAString(&'static str),

    #[error("unknown role '{0}'")]
    UnknownRole(String),
}

impl ClaimsError {
    /// Coarse category for server-side logs.
    pub fn reason(&self) -> RejectReason {
        match self {
            ClaimsError::NotJson | ClaimsError::NotObject => RejectReason::Format,
            ClaimsError::Missing(_) | ClaimsError::NotAString(_) | ClaimsError::UnknownRole(_) => {
                RejectReason::Semantic
            }
        }
    }
}

/// Validate a decoded payload and build the principal it describes.
///
/// Only call this on bytes whose signature has already been checked.
///
/// - `subjectId`, `role`, `email`, `displayName` must be present and strings
/// - `role` must name a member of [`Role`]
/// - `issuedAt` falls back to `now` when absent or not an integer; tokens
///   minted before the field existed stay valid
/// - unknown keys are ignored
pub fn parse_claims(payload: &[u8], now: i64) -> Result<Principal, ClaimsError> {
    let value: Value = serde_json::from_slice(payload).map_err(|_| ClaimsError::NotJson)?;
    let Value::Object(map) = value else {
        return Err(ClaimsError::NotObject);
    };

    let subject_id = required_str(&map, "subjectId")?;
    let role = required_str(&map, "role")?;
    let email = required_str(&map, "email")?;
    let display_name = required_str(&map, "displayName")?;

    let role: Role = role
        .parse()
        .map_err(|_| ClaimsError::UnknownRole(role.to_string()))?;

    let issued_at = map.get("issuedAt").and_then(Value::as_i64).unwrap_or(now);

    Ok(Principal {
        subject_id: SubjectId::new(subject_id),
        role,
        email: email.to_string(),
        display_name: display_name.to_string(),
        issued_at,
    })
}

fn required_str<'a>(map: &'a Map<String, Value>, key: &'static str) -> Result<&'a str, ClaimsError> {
    match map.get(key) {
        None => Err(ClaimsError::Missing(key)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ClaimsError::NotAString(key)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const NOW: i64 = 1_750_000_000;

    fn full() -> Value {
        json!({
            "subjectId": "u-9",
            "role": "ADMIN",
            "email": "a@example.com",
            "displayName": "Ada",
            "issuedAt": 1_700_000_000,
        })
    }

    fn parse(value: &Value) -> Result<Principal, ClaimsError> {
        parse_claims(&serde_json::to_vec(value).unwrap(), NOW)
    }

    #[test]
    fn parses_complete_payload() {
        let p = parse(&full()).unwrap();
        assert_eq!(p.subject_id.as_str(), "u-9");
        assert_eq!(p.role, Role::Admin);
        assert_eq!(p.email, "a@example.com");
        assert_eq!(p.display_name, "Ada");
        assert_eq!(p.issued_at, 1_700_000_000);
    }

    #[test]
    fn missing_issued_at_is_backfilled() {
        let mut v = full();
        v.as_object_mut().unwrap().remove("issuedAt");
        assert_eq!(parse(&v).unwrap().issued_at, NOW);
    }

    #[test]
    fn non_integer_issued_at_is_backfilled() {
        for bad in [json!("yesterday"), json!(1.5), json!(null), json!([1])] {
            let mut v = full();
            v["issuedAt"] = bad;
            assert_eq!(parse(&v).unwrap().issued_at, NOW);
        }
    }

    #[test]
    fn every_string_claim_is_required() {
        for key in ["subjectId", "role", "email", "displayName"] {
            let mut v = full();
            v.as_object_mut().unwrap().remove(key);
            assert_eq!(parse(&v).unwrap_err(), ClaimsError::Missing(key));
        }
    }

    #[test]
    fn string_claims_must_be_strings() {
        for key in ["subjectId", "role", "email", "displayName"] {
            let mut v = full();
            v[key] = json!(12);
            assert_eq!(parse(&v).unwrap_err(), ClaimsError::NotAString(key));
        }
    }

    #[test]
    fn unknown_role_rejected() {
        let mut v = full();
        v["role"] = json!("OWNER");
        let err = parse(&v).unwrap_err();
        assert_eq!(err, ClaimsError::UnknownRole("OWNER".to_string()));
        assert_eq!(err.reason(), RejectReason::Semantic);
    }

    #[test]
    fn non_object_payloads_are_format_errors() {
        assert_eq!(parse_claims(b"not json", NOW).unwrap_err(), ClaimsError::NotJson);
        let err = parse_claims(b"[1,2,3]", NOW).unwrap_err();
        assert_eq!(err, ClaimsError::NotObject);
        assert_eq!(err.reason(), RejectReason::Format);
    }

    #[test]
    fn extra_keys_are_ignored() {
        let mut v = full();
        v["theme"] = json!("dark");
        assert!(parse(&v).is_ok());
    }
}
