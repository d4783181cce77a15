//! Session lifecycle: create, read and destroy the session cookie.
//!
//! There is no server-side session store. The cookie is the session; these
//! three operations are its only state transitions.

use tracing::info;

use gatehouse_core::{Identity, Principal, SESSION_COOKIE_NAME, SESSION_MAX_AGE_SECS};

use crate::codec::TokenCodec;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// A cookie to be written to the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: &'static str,
    pub value: String,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    pub max_age_secs: i64,
    pub path: &'static str,
}

impl SessionCookie {
    /// The session cookie carrying `token`.
    pub fn session(token: String, secure: bool) -> Self {
        Self {
            name: SESSION_COOKIE_NAME,
            value: token,
            http_only: true,
            secure,
            same_site: SameSite::Lax,
            max_age_secs: SESSION_MAX_AGE_SECS,
            path: "/",
        }
    }

    /// Same attributes, empty value, expired immediately.
    pub fn removal(secure: bool) -> Self {
        Self {
            value: String::new(),
            max_age_secs: 0,
            ..Self::session(String::new(), secure)
        }
    }

    /// Render as a `Set-Cookie` header value.
    pub fn to_header_value(&self) -> String {
        let mut cookie = format!(
            "{}={}; Path={}; Max-Age={}; SameSite={}",
            self.name,
            self.value,
            self.path,
            self.max_age_secs,
            self.same_site.as_str()
        );
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Cookie access for one request/response cycle.
///
/// Implemented by the transport layer; keeps this crate free of HTTP types.
pub trait CookieJar {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&mut self, cookie: SessionCookie);
    fn remove(&mut self, cookie: SessionCookie);
}

#[derive(Debug, Clone)]
pub struct SessionManager {
    codec: TokenCodec,
    secure_cookies: bool,
}

impl SessionManager {
    /// `secure_cookies` should be true whenever serving in production.
    pub fn new(codec: TokenCodec, secure_cookies: bool) -> Self {
        Self {
            codec,
            secure_cookies,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Mint a token for `identity` and set it on the jar.
    pub fn create(&self, identity: Identity, jar: &mut impl CookieJar) -> Principal {
        let (principal, token) = self.codec.issue(identity);
        jar.set(SessionCookie::session(token, self.secure_cookies));
        info!(
            subject_id = %principal.subject_id,
            role = %principal.role,
            "session created"
        );
        principal
    }

    /// The current principal, or `None` when the cookie is absent or invalid.
    pub fn read(&self, jar: &impl CookieJar) -> Option<Principal> {
        let token = jar.get(SESSION_COOKIE_NAME)?;
        self.codec.decode(&token)
    }

    pub fn destroy(&self, jar: &mut impl CookieJar) {
        jar.remove(SessionCookie::removal(self.secure_cookies));
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use gatehouse_core::{Role, SigningSecret, SubjectId, unix_now};

    use super::*;

    #[derive(Default)]
    struct MemoryJar {
        cookies: HashMap<String, String>,
        written: Vec<SessionCookie>,
    }

    impl CookieJar for MemoryJar {
        fn get(&self, name: &str) -> Option<String> {
            self.cookies.get(name).cloned()
        }

        fn set(&mut self, cookie: SessionCookie) {
            self.cookies.insert(cookie.name.to_string(), cookie.value.clone());
            self.written.push(cookie);
        }

        fn remove(&mut self, cookie: SessionCookie) {
            self.cookies.remove(cookie.name);
            self.written.push(cookie);
        }
    }

    fn manager(secure: bool) -> SessionManager {
        SessionManager::new(TokenCodec::new(SigningSecret::new("s3cret").unwrap()), secure)
    }

    fn identity() -> Identity {
        Identity {
            subject_id: SubjectId::new("u-7"),
            role: Role::Editor,
            email: "ed@example.com".to_string(),
            display_name: "Ed".to_string(),
        }
    }

    #[test]
    fn create_then_read() {
        let m = manager(false);
        let mut jar = MemoryJar::default();
        let before = unix_now();
        let created = m.create(identity(), &mut jar);
        assert!(created.issued_at >= before);
        assert_eq!(m.read(&jar), Some(created));
    }

    #[test]
    fn read_without_cookie_is_none() {
        assert_eq!(manager(false).read(&MemoryJar::default()), None);
    }

    #[test]
    fn read_with_garbage_cookie_is_none() {
        let mut jar = MemoryJar::default();
        jar.cookies
            .insert(SESSION_COOKIE_NAME.to_string(), "garbage".to_string());
        assert_eq!(manager(false).read(&jar), None);
    }

    #[test]
    fn destroy_clears_session() {
        let m = manager(true);
        let mut jar = MemoryJar::default();
        m.create(identity(), &mut jar);
        m.destroy(&mut jar);
        assert_eq!(m.read(&jar), None);
        let last = jar.written.last().unwrap();
        assert_eq!(last.max_age_secs, 0);
        assert!(last.value.is_empty());
        assert!(last.secure);
    }

    #[test]
    fn cookie_attributes_are_fixed() {
        let m = manager(false);
        let mut jar = MemoryJar::default();
        m.create(identity(), &mut jar);
        let cookie = &jar.written[0];
        assert!(cookie.http_only);
        assert!(!cookie.secure);
        assert_eq!(cookie.same_site, SameSite::Lax);
        assert_eq!(cookie.max_age_secs, 604_800);
        assert_eq!(cookie.path, "/");
    }

    #[test]
    fn header_rendering() {
        let cookie = SessionCookie::session("abc.def".to_string(), true);
        assert_eq!(
            cookie.to_header_value(),
            "gatehouse_session=abc.def; Path=/; Max-Age=604800; SameSite=Lax; HttpOnly; Secure"
        );
        assert_eq!(
            SessionCookie::removal(false).to_header_value(),
            "gatehouse_session=; Path=/; Max-Age=0; SameSite=Lax; HttpOnly"
        );
    }
}
