use std::sync::Arc;

use thiserror::Error;

/// Development-only signing key. Loud on purpose.
pub const DEV_FALLBACK_SECRET: &str = "insecure-dev-session-secret-do-not-use-in-production";

/// Shortest secret accepted when serving in a production posture.
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SecretError {
    #[error("session secret is empty")]
    Empty,

    #[error("session secret is the development fallback")]
    DevFallback,

    #[error("session secret is {actual} bytes, need at least {min}")]
    TooShort { actual: usize, min: usize },
}

/// Process-wide HMAC key for session tokens.
///
/// Loaded once at startup and passed into whatever needs it. Cloning shares
/// the same bytes. Rotating it invalidates every outstanding token.
#[derive(Clone)]
pub struct SigningSecret(Arc<[u8]>);

impl SigningSecret {
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self, SecretError> {
        let bytes = bytes.as_ref();
        if bytes.is_empty() {
            return Err(SecretError::Empty);
        }
        Ok(Self(Arc::from(bytes)))
    }

    pub fn dev_fallback() -> Self {
        Self(Arc::from(DEV_FALLBACK_SECRET.as_bytes()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_dev_fallback(&self) -> bool {
        self.as_bytes() == DEV_FALLBACK_SECRET.as_bytes()
    }

    /// Reject secrets that must never sign production sessions.
    pub fn ensure_production_grade(&self) -> Result<(), SecretError> {
        if self.is_dev_fallback() {
            return Err(SecretError::DevFallback);
        }
        if self.len() < MIN_PRODUCTION_SECRET_LEN {
            return Err(SecretError::TooShort {
                actual: self.len(),
                min: MIN_PRODUCTION_SECRET_LEN,
            });
        }
        Ok(())
    }
}

impl core::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SigningSecret")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
