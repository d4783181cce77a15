//! Session cookie constants and `Cookie` header parsing.

/// Name of the cookie holding the session token.
pub const SESSION_COOKIE_NAME: &str = "gatehouse_session";

/// Seven days.
pub const SESSION_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

/// Find a cookie by name in a raw `Cookie` request header.
///
/// First match wins. An empty value counts as absent.
pub fn find_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}
