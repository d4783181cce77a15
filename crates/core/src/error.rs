//! Session error model.

use thiserror::Error;

/// Why a token failed to decode.
///
/// Server-side diagnostics only. Every variant collapses to "no valid
/// session" before anything reaches a caller, so none of this may be put
/// in a response body or status code.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Wrong segment count, bad base64, or a payload that is not a JSON object.
    #[error("malformed token")]
    Format,

    /// Signature does not match the payload under this secret.
    #[error("signature mismatch")]
    Integrity,

    /// Well-formed payload with a missing field or an unknown role.
    #[error("invalid session claims")]
    Semantic,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Format => "format",
            RejectReason::Integrity => "integrity",
            RejectReason::Semantic => "semantic",
        }
    }
}

/// Caller-visible outcome of a guarded request.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// No valid session. Deliberately says nothing about why.
    #[error("authentication required")]
    Unauthenticated,

    /// Valid session whose role is not allowed here.
    #[error("forbidden")]
    Forbidden,
}
