use serde::Serialize;
use thiserror::Error;

use gatehouse_core::{Principal, Role};

use crate::policy::{PolicyTable, RoleSet};

/// Something a principal may try to reach.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Resource<'a> {
    Page(&'a str),
    Action(&'a str),
    Api { method: &'a str, path: &'a str },
}

impl core::fmt::Display for Resource<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Resource::Page(page) => write!(f, "page {page}"),
            Resource::Action(action) => write!(f, "action {action}"),
            Resource::Api { method, path } => write!(f, "{method} {path}"),
        }
    }
}

/// Why access was granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Grant {
    /// The super-role needs no entry.
    SuperRole,
    /// An entry listed the principal's role.
    Rule { key: String, wildcard: bool },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Denial {
    /// An entry exists but does not list the role.
    NotPermitted,
    /// Nothing in the table covers the resource.
    NoPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow(Grant),
    Deny(Denial),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: role {role} may not access {resource}")]
    Forbidden { role: Role, resource: String },

    #[error("no policy covers {0}")]
    NoPolicy(String),
}

struct Matched<'t> {
    key: &'t str,
    wildcard: bool,
    roles: RoleSet,
}

impl PolicyTable {
    /// Decide whether `role` may reach `resource`.
    ///
    /// 1. the super-role is always allowed
    /// 2. otherwise the matching entry (exact, then wildcard for API keys)
    ///    must list the role
    /// 3. no matching entry denies
    pub fn evaluate(&self, role: Role, resource: Resource<'_>) -> Decision {
        if role.is_super() {
            return Decision::Allow(Grant::SuperRole);
        }
        match self.lookup(resource) {
            Some(m) if m.roles.contains(role) => Decision::Allow(Grant::Rule {
                key: m.key.to_string(),
                wildcard: m.wildcard,
            }),
            Some(_) => Decision::Deny(Denial::NotPermitted),
            None => Decision::Deny(Denial::NoPolicy),
        }
    }

    pub fn check_page(&self, role: Role, page: &str) -> Decision {
        self.evaluate(role, Resource::Page(page))
    }

    pub fn check_action(&self, role: Role, action: &str) -> Decision {
        self.evaluate(role, Resource::Action(action))
    }

    pub fn check_api(&self, role: Role, method: &str, path: &str) -> Decision {
        self.evaluate(role, Resource::Api { method, path })
    }

    pub fn can_view_page(&self, role: Role, page: &str) -> bool {
        self.check_page(role, page).is_allowed()
    }

    pub fn can_perform(&self, role: Role, action: &str) -> bool {
        self.check_action(role, action).is_allowed()
    }

    pub fn can_call(&self, role: Role, method: &str, path: &str) -> bool {
        self.check_api(role, method, path).is_allowed()
    }

    /// Pages `role` may open, in table order. Feeds server-rendered navigation.
    pub fn allowed_pages(&self, role: Role) -> Vec<&str> {
        self.pages()
            .iter()
            .filter(|rule| role.is_super() || rule.roles.contains(role))
            .map(|rule| rule.key.as_str())
            .collect()
    }

    /// Actions `role` may run, in table order. Feeds the action palette.
    pub fn allowed_actions(&self, role: Role) -> Vec<&str> {
        self.actions()
            .iter()
            .filter(|rule| role.is_super() || rule.roles.contains(role))
            .map(|rule| rule.key.as_str())
            .collect()
    }

    fn lookup(&self, resource: Resource<'_>) -> Option<Matched<'_>> {
        match resource {
            Resource::Page(page) => self.page_rule(page).map(|r| Matched {
                key: &r.key,
                wildcard: false,
                roles: r.roles,
            }),
            Resource::Action(action) => self.action_rule(action).map(|r| Matched {
                key: &r.key,
                wildcard: false,
                roles: r.roles,
            }),
            Resource::Api { method, path } => self.api_rule(method, path).map(|r| Matched {
                key: &r.key,
                wildcard: r.path.is_wildcard(),
                roles: r.roles,
            }),
        }
    }
}

/// Authorize an authenticated principal against the table.
pub fn authorize(
    table: &PolicyTable,
    principal: &Principal,
    resource: Resource<'_>,
) -> Result<Grant, AuthzError> {
    match table.evaluate(principal.role, resource) {
        Decision::Allow(grant) => Ok(grant),
        Decision::Deny(Denial::NotPermitted) => Err(AuthzError::Forbidden {
            role: principal.role,
            resource: resource.to_string(),
        }),
        Decision::Deny(Denial::NoPolicy) => Err(AuthzError::NoPolicy(resource.to_string())),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationExplanation {
    pub resource: String,
    pub role: Role,
    pub granted: bool,

    /// Human-readable reason for the decision.
    pub reason: String,

    /// Table entry that decided the outcome, if any.
    pub matched_entry: Option<String>,

    /// Roles the matched entry admits (super-role always implied).
    pub allowed_roles: Vec<Role>,

    pub denial: Option<Denial>,
}

/// Explain why `role` is allowed or denied `resource`.
pub fn explain_authorization(
    table: &PolicyTable,
    role: Role,
    resource: Resource<'_>,
) -> AuthorizationExplanation {
    let matched = table.lookup(resource);
    let matched_entry = matched.as_ref().map(|m| m.key.to_string());
    let allowed_roles = matched
        .as_ref()
        .map(|m| m.roles.with(Role::SUPER).roles())
        .unwrap_or_else(|| vec![Role::SUPER]);

    let (granted, reason, denial) = match table.evaluate(role, resource) {
        Decision::Allow(Grant::SuperRole) => {
            (true, format!("{role} bypasses every policy check"), None)
        }
        Decision::Allow(Grant::Rule { key, wildcard: true }) => (
            true,
            format!("wildcard entry '{key}' admits {role}"),
            None,
        ),
        Decision::Allow(Grant::Rule { key, wildcard: false }) => {
            (true, format!("entry '{key}' admits {role}"), None)
        }
        Decision::Deny(Denial::NotPermitted) => (
            false,
            format!(
                "entry '{}' does not admit {role}",
                matched_entry.as_deref().unwrap_or_default()
            ),
            Some(Denial::NotPermitted),
        ),
        Decision::Deny(Denial::NoPolicy) => (
            false,
            format!("no entry covers {resource}; only {} is admitted", Role::SUPER),
            Some(Denial::NoPolicy),
        ),
    };

    AuthorizationExplanation {
        resource: resource.to_string(),
        role,
        granted,
        reason,
        matched_entry,
        allowed_roles,
        denial,
    }
}
