//! Request pre-filter: bounce unauthenticated requests for protected pages
//! to the login page before they reach the application.

use tracing::debug;

use gatehouse_core::{Principal, SESSION_COOKIE_NAME, SessionVerifier, find_cookie};

use crate::verifier::EdgeVerifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// A path is protected when it equals a prefix or continues it with `/`.
    pub protected_prefixes: Vec<String>,
    /// Always reachable, even though it sits under a protected prefix.
    pub login_path: String,
    /// Query parameter carrying the originally requested path.
    pub return_param: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            protected_prefixes: vec!["/admin".to_string()],
            login_path: "/admin/login".to_string(),
            return_param: "from".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Not protected (or the login page itself); pass through untouched.
    Public,
    /// Protected, and the session verified at the edge.
    Proceed(Principal),
    /// Protected, no valid session: send the browser here.
    Redirect(String),
}

#[derive(Debug, Clone)]
pub struct EdgeGate {
    verifier: EdgeVerifier,
    config: GateConfig,
}

impl EdgeGate {
    pub fn new(verifier: EdgeVerifier, config: GateConfig) -> Self {
        Self { verifier, config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn is_protected(&self, path: &str) -> bool {
        if path == self.config.login_path {
            return false;
        }
        self.config
            .protected_prefixes
            .iter()
            .any(|prefix| is_under(path, prefix))
    }

    /// `path_and_query` is the request target as received; the query is
    /// ignored for matching but kept in the return target.
    pub async fn evaluate(&self, path_and_query: &str, cookie_header: Option<&str>) -> GateOutcome {
        let path = path_and_query
            .split_once('?')
            .map_or(path_and_query, |(path, _)| path);
        if !self.is_protected(path) {
            return GateOutcome::Public;
        }

        let token = cookie_header.and_then(|header| find_cookie(header, SESSION_COOKIE_NAME));
        let principal = match token {
            Some(token) => self.verifier.verify(token).await,
            None => None,
        };

        match principal {
            Some(principal) => GateOutcome::Proceed(principal),
            None => {
                debug!(path, "no valid session at edge, redirecting to login");
                GateOutcome::Redirect(self.login_redirect(path_and_query))
            }
        }
    }

    pub fn login_redirect(&self, path_and_query: &str) -> String {
        format!(
            "{}?{}={}",
            self.config.login_path,
            self.config.return_param,
            urlencoding::encode(path_and_query)
        )
    }
}

fn is_under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
