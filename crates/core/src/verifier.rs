use async_trait::async_trait;

use crate::Principal;

/// Turns a raw session token into a principal, or nothing.
///
/// Implemented once per execution environment (the full server codec and
/// the edge verifier). Both implementations must accept and reject exactly
/// the same tokens; the shared equivalence tests hold them to that.
///
/// Total over attacker input: no error type, no panic. Every rejection looks
/// the same from the outside.
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Option<Principal>;
}
