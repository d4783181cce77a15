//! Session token framing: `base64(payload) + "." + hex(signature)`.

/// Separator between the payload and signature segments. Never part of the
/// base64 alphabet, so it cannot appear inside the payload.
pub const TOKEN_DELIMITER: char = '.';

/// Split a token into `(payload, signature)`.
///
/// Exactly two non-empty segments are required; zero delimiters, extra
/// delimiters or an empty side all yield `None`.
pub fn split_token(token: &str) -> Option<(&str, &str)> {
    let mut parts = token.split(TOKEN_DELIMITER);
    let payload = parts.next()?;
    let signature = parts.next()?;
    if parts.next().is_some() || payload.is_empty() || signature.is_empty() {
        return None;
    }
    Some((payload, signature))
}

/// Join the two segments back into a token.
pub fn join_token(payload: &str, signature: &str) -> String {
    let mut token = String::with_capacity(payload.len() + signature.len() + 1);
    token.push_str(payload);
    token.push(TOKEN_DELIMITER);
    token.push_str(signature);
    token
}
