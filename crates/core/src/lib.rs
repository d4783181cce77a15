//! `gatehouse-core`: the session data model shared by every verifier.
//!
//! Nothing in here touches cryptography. The full server and the edge
//! verifier both depend on this crate so that token structure, claim
//! validation and cookie parsing are defined exactly once.

pub mod claims;
pub mod cookie;
pub mod error;
pub mod id;
pub mod principal;
pub mod role;
pub mod secret;
pub mod token;
pub mod verifier;

pub use claims::{ClaimsError, parse_claims};
pub use cookie::{SESSION_COOKIE_NAME, SESSION_MAX_AGE_SECS, find_cookie};
pub use error::{AccessError, RejectReason};
pub use id::SubjectId;
pub use principal::{Identity, Principal, unix_now};
pub use role::{Role, UnknownRole};
pub use secret::{DEV_FALLBACK_SECRET, MIN_PRODUCTION_SECRET_LEN, SecretError, SigningSecret};
pub use token::{TOKEN_DELIMITER, join_token, split_token};
pub use verifier::SessionVerifier;
