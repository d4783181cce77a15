//! Session token codec for the full server environment.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;
use tracing::debug;

use gatehouse_core::{
    Identity, Principal, RejectReason, SessionVerifier, SigningSecret, join_token, parse_claims,
    split_token, unix_now,
};

use crate::signature;

/// Encodes principals into signed tokens and decodes them back.
///
/// Token layout: `base64(json) + "." + hex(hmac_sha256(secret, base64(json)))`.
/// The signature covers the base64 text exactly as transmitted, so it is
/// the only integrity check: a tampered payload fails because its signature
/// no longer matches.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    secret: SigningSecret,
}

impl TokenCodec {
    pub fn new(secret: SigningSecret) -> Self {
        Self { secret }
    }

    /// Stamp `identity` with the current time and encode it.
    pub fn issue(&self, identity: Identity) -> (Principal, String) {
        let principal = Principal::issue(identity, unix_now());
        let token = self.encode(&principal);
        (principal, token)
    }

    pub fn encode(&self, principal: &Principal) -> String {
        let body = json!({
            "subjectId": principal.subject_id.as_str(),
            "role": principal.role.as_str(),
            "email": principal.email,
            "displayName": principal.display_name,
            "issuedAt": principal.issued_at,
        });
        let payload = STANDARD.encode(body.to_string());
        let signature = signature::sign(&self.secret, payload.as_bytes());
        join_token(&payload, &signature)
    }

    /// Decode and verify a token. Every failure is `None`.
    pub fn decode(&self, token: &str) -> Option<Principal> {
        self.decode_at(token, unix_now())
    }

    /// As [`decode`](Self::decode), backfilling a missing `issuedAt` with `now`.
    pub fn decode_at(&self, token: &str, now: i64) -> Option<Principal> {
        match self.try_decode(token, now) {
            Ok(principal) => Some(principal),
            Err(reason) => {
                debug!(reason = reason.as_str(), "rejected session token");
                None
            }
        }
    }

    /// Decode keeping the rejection category. Server-side diagnostics only.
    pub fn try_decode(&self, token: &str, now: i64) -> Result<Principal, RejectReason> {
        let (payload, signature) = split_token(token).ok_or(RejectReason::Format)?;

        // Nothing about the payload is looked at before the signature holds.
        if !signature::verify(&self.secret, payload.as_bytes(), signature) {
            return Err(RejectReason::Integrity);
        }

        let bytes = STANDARD.decode(payload).map_err(|_| RejectReason::Format)?;
        parse_claims(&bytes, now).map_err(|e| e.reason())
    }
}

#[async_trait]
impl SessionVerifier for TokenCodec {
    async fn verify(&self, token: &str) -> Option<Principal> {
        self.decode(token)
    }
}

#[cfg(test)]
mod tests {
    use gatehouse_core::{Role, SubjectId};
    use proptest::prelude::*;
    use serde_json::Value;

    use super::*;

    fn codec(secret: &str) -> TokenCodec {
        TokenCodec::new(SigningSecret::new(secret).unwrap())
    }

    fn principal() -> Principal {
        Principal {
            subject_id: SubjectId::new("user-1"),
            role: Role::Admin,
            email: "ada@example.com".to_string(),
            display_name: "Ada Lovelace".to_string(),
            issued_at: 1_700_000_000,
        }
    }

    /// Sign an arbitrary JSON payload the way `encode` would.
    fn forge_signed(codec: &TokenCodec, body: &Value) -> String {
        let payload = STANDARD.encode(body.to_string());
        let sig = signature::sign(&codec.secret, payload.as_bytes());
        join_token(&payload, &sig)
    }

    fn arb_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    prop_compose! {
        fn arb_principal()(
            subject in "[A-Za-z0-9_-]{1,36}",
            role in arb_role(),
            email in "[a-z]{1,12}@[a-z]{1,12}\\.[a-z]{2,4}",
            display_name in "\\PC{0,40}",
            issued_at in 0i64..4_000_000_000,
        ) -> Principal {
            Principal {
                subject_id: SubjectId::new(subject),
                role,
                email,
                display_name,
                issued_at,
            }
        }
    }

    #[test]
    fn round_trip() {
        let c = codec("secret");
        let p = principal();
        assert_eq!(c.decode(&c.encode(&p)), Some(p));
    }

    #[test]
    fn token_shape() {
        let token = codec("secret").encode(&principal());
        let (payload, sig) = split_token(&token).unwrap();
        assert_eq!(sig.len(), signature::SIGNATURE_HEX_LEN);
        let body: Value = serde_json::from_slice(&STANDARD.decode(payload).unwrap()).unwrap();
        assert_eq!(body["subjectId"], "user-1");
        assert_eq!(body["role"], "ADMIN");
        assert_eq!(body["issuedAt"], 1_700_000_000);
    }

    #[test]
    fn issue_stamps_current_time() {
        let before = unix_now();
        let (p, token) = codec("secret").issue(principal().identity());
        assert!(p.issued_at >= before);
        assert_eq!(codec("secret").decode(&token), Some(p));
    }

    #[test]
    fn wrong_segment_counts_are_format_errors() {
        let c = codec("secret");
        let token = c.encode(&principal());
        for bad in [
            String::new(),
            token.replace('.', ""),
            format!("{token}.extra"),
            format!("x.{token}"),
        ] {
            assert_eq!(c.try_decode(&bad, 0), Err(RejectReason::Format), "{bad}");
        }
    }

    #[test]
    fn unknown_role_with_valid_signature_rejected() {
        let c = codec("secret");
        let token = forge_signed(
            &c,
            &json!({
                "subjectId": "u", "role": "OWNER", "email": "e", "displayName": "d", "issuedAt": 1
            }),
        );
        assert_eq!(c.try_decode(&token, 0), Err(RejectReason::Semantic));
        assert_eq!(c.decode(&token), None);
    }

    #[test]
    fn missing_issued_at_is_backfilled() {
        let c = codec("secret");
        let before = unix_now();
        let token = forge_signed(
            &c,
            &json!({ "subjectId": "u", "role": "EDITOR", "email": "e", "displayName": "d" }),
        );
        let p = c.decode(&token).unwrap();
        assert!(p.issued_at >= before);
        assert_eq!(p.role, Role::Editor);
    }

    #[test]
    fn signed_garbage_payloads_are_rejected() {
        let c = codec("secret");
        let not_base64 = "%%%%";
        let sig = signature::sign(&c.secret, not_base64.as_bytes());
        assert_eq!(
            c.try_decode(&join_token(not_base64, &sig), 0),
            Err(RejectReason::Format)
        );

        let not_json = STANDARD.encode("definitely not json");
        let sig = signature::sign(&c.secret, not_json.as_bytes());
        assert_eq!(
            c.try_decode(&join_token(&not_json, &sig), 0),
            Err(RejectReason::Format)
        );
    }

    #[test]
    fn tampered_payload_with_original_signature_fails_integrity() {
        let c = codec("secret");
        let token = c.encode(&principal());
        let (_, sig) = split_token(&token).unwrap();
        let mut elevated = principal();
        elevated.role = Role::SuperAdmin;
        let elevated_token = c.encode(&elevated);
        let (elevated_payload, _) = split_token(&elevated_token).unwrap();
        let spliced = join_token(elevated_payload, sig);
        assert_eq!(c.try_decode(&spliced, 0), Err(RejectReason::Integrity));
    }

    #[tokio::test]
    async fn implements_session_verifier() {
        let c = codec("secret");
        let token = c.encode(&principal());
        let verifier: &dyn SessionVerifier = &c;
        assert_eq!(verifier.verify(&token).await, Some(principal()));
        assert_eq!(verifier.verify("nope").await, None);
    }

    proptest! {
        /// Property: decode(encode(p)) == p.
        #[test]
        fn round_trip_law(p in arb_principal(), secret in "[ -~]{1,64}") {
            let c = codec(&secret);
            prop_assert_eq!(c.decode(&c.encode(&p)), Some(p));
        }

        /// Property: a token never verifies under a different secret.
        #[test]
        fn key_sensitivity(p in arb_principal(), s1 in "[ -~]{1,32}", s2 in "[ -~]{1,32}") {
            prop_assume!(s1 != s2);
            let token = codec(&s1).encode(&p);
            prop_assert_eq!(codec(&s2).try_decode(&token, 0), Err(RejectReason::Integrity));
        }

        /// Property: flipping any bit of the payload segment invalidates the token.
        #[test]
        fn payload_bit_flip_invalidates(p in arb_principal(), idx in any::<prop::sample::Index>(), bit in 0u8..7) {
            let c = codec("secret");
            let token = c.encode(&p);
            let (payload, sig) = split_token(&token).unwrap();
            let mut bytes = payload.as_bytes().to_vec();
            let i = idx.index(bytes.len());
            bytes[i] ^= 1 << bit;
            let tampered = join_token(&String::from_utf8(bytes).unwrap(), sig);
            prop_assert_eq!(c.decode(&tampered), None);
        }

        /// Property: flipping any bit of the signature segment invalidates the token.
        #[test]
        fn signature_bit_flip_invalidates(p in arb_principal(), idx in any::<prop::sample::Index>(), bit in 0u8..7) {
            let c = codec("secret");
            let token = c.encode(&p);
            let (payload, sig) = split_token(&token).unwrap();
            let mut bytes = sig.as_bytes().to_vec();
            let i = idx.index(bytes.len());
            bytes[i] ^= 1 << bit;
            let tampered = join_token(payload, &String::from_utf8(bytes).unwrap());
            prop_assert_eq!(c.decode(&tampered), None);
        }

        /// Property: anything that is not exactly two segments decodes to nothing.
        #[test]
        fn non_two_segment_tokens_rejected(parts in prop::collection::vec("[A-Za-z0-9+/=]{0,12}", 0..6)) {
            prop_assume!(parts.len() != 2);
            let c = codec("secret");
            prop_assert_eq!(c.try_decode(&parts.join("."), 0), Err(RejectReason::Format));
        }
    }
}
