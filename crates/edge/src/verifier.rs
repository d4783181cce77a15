use async_trait::async_trait;
use tracing::debug;

use gatehouse_core::{
    Principal, RejectReason, SessionVerifier, SigningSecret, parse_claims, split_token, unix_now,
};

use crate::b64::Base64Decoder;
use crate::crypto::{HmacKey, hex_lower, timing_safe_equal};

const SIGNATURE_HEX_LEN: usize = 64;

/// Edge-side session token verifier.
///
/// Same acceptance rules as `gatehouse_auth::TokenCodec::decode`, in the
/// same order: framing, signature, base64, claims.
#[derive(Debug, Clone)]
pub struct EdgeVerifier {
    key: HmacKey,
    decoder: Base64Decoder,
}

impl EdgeVerifier {
    pub async fn new(secret: &SigningSecret) -> Self {
        Self {
            key: HmacKey::import(secret).await,
            decoder: Base64Decoder::detect(),
        }
    }

    pub fn with_decoder(mut self, decoder: Base64Decoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub async fn verify_at(&self, token: &str, now: i64) -> Option<Principal> {
        match self.check(token, now).await {
            Ok(principal) => Some(principal),
            Err(reason) => {
                debug!(reason = reason.as_str(), "edge rejected session token");
                None
            }
        }
    }

    /// Verify keeping the rejection category. Server-side diagnostics only.
    pub async fn check(&self, token: &str, now: i64) -> Result<Principal, RejectReason> {
        let (payload, signature) = split_token(token).ok_or(RejectReason::Format)?;

        if signature.len() != SIGNATURE_HEX_LEN {
            return Err(RejectReason::Integrity);
        }
        let expected = hex_lower(&self.key.sign(payload.as_bytes()).await);
        if !timing_safe_equal(expected.as_bytes(), signature.as_bytes()) {
            return Err(RejectReason::Integrity);
        }

        let bytes = self.decoder.decode(payload).ok_or(RejectReason::Format)?;
        parse_claims(&bytes, now).map_err(|e| e.reason())
    }
}

#[async_trait]
impl SessionVerifier for EdgeVerifier {
    async fn verify(&self, token: &str) -> Option<Principal> {
        self.verify_at(token, unix_now()).await
    }
}
