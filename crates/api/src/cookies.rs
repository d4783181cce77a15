//! Bridges axum headers to the session manager's `CookieJar`.

use axum::http::{HeaderMap, HeaderValue, header};
use tracing::warn;

use gatehouse_auth::{CookieJar, SessionCookie};
use gatehouse_core::find_cookie;

/// Cookies read from one request plus the ones to write on its response.
#[derive(Debug, Default)]
pub struct HeaderCookieJar {
    incoming: Option<String>,
    outgoing: Vec<SessionCookie>,
}

impl HeaderCookieJar {
    /// Multiple `Cookie` headers are folded into one list.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let values: Vec<&str> = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        let incoming = (!values.is_empty()).then(|| values.join("; "));
        Self {
            incoming,
            outgoing: Vec::new(),
        }
    }

    /// The folded request `Cookie` header, if any.
    pub fn header(&self) -> Option<&str> {
        self.incoming.as_deref()
    }

    pub fn pending(&self) -> &[SessionCookie] {
        &self.outgoing
    }

    /// Append one `Set-Cookie` per queued cookie.
    pub fn write_to(self, headers: &mut HeaderMap) {
        for cookie in self.outgoing {
            match HeaderValue::from_str(&cookie.to_header_value()) {
                Ok(value) => {
                    headers.append(header::SET_COOKIE, value);
                }
                Err(_) => warn!(name = cookie.name, "dropping unrepresentable cookie"),
            }
        }
    }
}

impl CookieJar for HeaderCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        let header = self.incoming.as_deref()?;
        find_cookie(header, name).map(str::to_string)
    }

    fn set(&mut self, cookie: SessionCookie) {
        self.outgoing.push(cookie);
    }

    fn remove(&mut self, cookie: SessionCookie) {
        self.outgoing.push(cookie);
    }
}

#[cfg(test)]
mod tests {
    use gatehouse_core::SESSION_COOKIE_NAME;

    use super::*;

    #[test]
    fn reads_across_multiple_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("gatehouse_session=abc.def"),
        );

        let jar = HeaderCookieJar::from_headers(&headers);
        assert_eq!(jar.get(SESSION_COOKIE_NAME).as_deref(), Some("abc.def"));
        assert_eq!(jar.get("theme").as_deref(), Some("dark"));
        assert_eq!(jar.get("missing"), None);
    }

    #[test]
    fn no_cookie_header_means_nothing_to_read() {
        let jar = HeaderCookieJar::from_headers(&HeaderMap::new());
        assert_eq!(jar.get(SESSION_COOKIE_NAME), None);
    }

    #[test]
    fn queued_cookies_become_set_cookie_headers() {
        let mut jar = HeaderCookieJar::default();
        jar.set(SessionCookie::session("abc.def".to_string(), false));
        jar.remove(SessionCookie::removal(true));
        assert_eq!(jar.pending().len(), 2);

        let mut headers = HeaderMap::new();
        jar.write_to(&mut headers);
        let written: Vec<&str> = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(
            written,
            vec![
                "gatehouse_session=abc.def; Path=/; Max-Age=604800; SameSite=Lax; HttpOnly",
                "gatehouse_session=; Path=/; Max-Age=0; SameSite=Lax; HttpOnly; Secure",
            ]
        );
    }
}
