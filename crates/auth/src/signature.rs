//! Keyed signatures over token payloads (HMAC-SHA256, lowercase hex).
//!
//! The edge verifier computes the same function with a different toolkit;
//! any change here must be mirrored there or the equivalence suite fails.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use gatehouse_core::SigningSecret;

type HmacSha256 = Hmac<Sha256>;

/// Length of a hex-encoded HMAC-SHA256 tag.
pub const SIGNATURE_HEX_LEN: usize = 64;

/// Sign `payload` under `secret`, returning 64 lowercase hex characters.
pub fn sign(secret: &SigningSecret, payload: &[u8]) -> String {
    hex::encode(tag(secret, payload))
}

/// Check `signature_hex` against the expected signature of `payload`.
///
/// The comparison runs over the canonical hex text in constant time. A
/// length mismatch returns early, which reveals only that the length is
/// wrong. Non-hex or upper-case input simply fails to match.
pub fn verify(secret: &SigningSecret, payload: &[u8], signature_hex: &str) -> bool {
    if signature_hex.len() != SIGNATURE_HEX_LEN {
        return false;
    }
    let expected = sign(secret, payload);
    expected.as_bytes().ct_eq(signature_hex.as_bytes()).into()
}

fn tag(secret: &SigningSecret, payload: &[u8]) -> [u8; 32] {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload);
    mac.finalize().into_bytes().into()
}
