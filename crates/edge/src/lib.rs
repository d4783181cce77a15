//! `gatehouse-edge`: session verification for constrained runtimes.
//!
//! Re-implements token decoding using only a bare SHA-256 digest, an
//! asynchronous signing surface and a base64 decoder that works without
//! any codec library. Used as a pre-filter in front of the full
//! application, which still decodes the token again for the actual
//! authorization decision.
//!
//! Token structure, claim validation and cookie parsing come from
//! `gatehouse-core`, shared with the full codec. Only the crypto and
//! base64 layers differ.

pub mod b64;
pub mod crypto;
pub mod gate;
pub mod verifier;

pub use b64::Base64Decoder;
pub use crypto::{HmacKey, hex_lower, timing_safe_equal};
pub use gate::{EdgeGate, GateConfig, GateOutcome};
pub use verifier::EdgeVerifier;
