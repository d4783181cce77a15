//! HMAC-SHA256 assembled from a bare digest primitive.
//!
//! Mirrors what a Web-crypto style runtime offers: import a key once, then
//! sign asynchronously. Output must match `gatehouse_auth::signature`
//! byte for byte.

use sha2::{Digest, Sha256};

use gatehouse_core::SigningSecret;

const BLOCK_LEN: usize = 64;
const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5c;

/// An imported HMAC-SHA256 key (RFC 2104), pads precomputed.
#[derive(Clone)]
pub struct HmacKey {
    inner_pad: [u8; BLOCK_LEN],
    outer_pad: [u8; BLOCK_LEN],
}

impl HmacKey {
    pub async fn import(secret: &SigningSecret) -> Self {
        Self::from_bytes(secret.as_bytes())
    }

    fn from_bytes(key: &[u8]) -> Self {
        let mut block = [0u8; BLOCK_LEN];
        if key.len() > BLOCK_LEN {
            block[..32].copy_from_slice(&Sha256::digest(key));
        } else {
            block[..key.len()].copy_from_slice(key);
        }

        let mut inner_pad = [0u8; BLOCK_LEN];
        let mut outer_pad = [0u8; BLOCK_LEN];
        for (i, b) in block.iter().enumerate() {
            inner_pad[i] = b ^ IPAD;
            outer_pad[i] = b ^ OPAD;
        }
        Self {
            inner_pad,
            outer_pad,
        }
    }

    pub async fn sign(&self, data: &[u8]) -> [u8; 32] {
        let inner = Sha256::new()
            .chain_update(self.inner_pad)
            .chain_update(data)
            .finalize();
        Sha256::new()
            .chain_update(self.outer_pad)
            .chain_update(inner)
            .finalize()
            .into()
    }
}

impl core::fmt::Debug for HmacKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HmacKey").finish_non_exhaustive()
    }
}

/// Lowercase hex, no separators.
pub fn hex_lower(bytes: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(DIGITS[usize::from(b >> 4)] as char);
        out.push(DIGITS[usize::from(b & 0x0f)] as char);
    }
    out
}

/// Compare without an early exit on the first differing byte.
///
/// Unequal lengths return `false` straight away.
pub fn timing_safe_equal(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let diff = a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    std::hint::black_box(diff) == 0
}
