//! Declarative access policy: pages, named actions and API endpoints, each
//! mapped to the set of roles allowed through.
//!
//! Built once at startup and read concurrently afterwards. Navigation, the
//! action palette and API guards all consult the same [`PolicyTable`]; none
//! of them keeps its own copy of the rules.

use serde::Serialize;
use thiserror::Error;

use gatehouse_core::Role;

/// Compact set of roles.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const EMPTY: RoleSet = RoleSet(0);

    pub fn of(roles: &[Role]) -> Self {
        roles.iter().fold(Self::EMPTY, |set, role| set.with(*role))
    }

    pub fn with(self, role: Role) -> Self {
        Self(self.0 | 1 << role.ordinal())
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0 & (1 << role.ordinal()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Members in [`Role::ALL`] order.
    pub fn roles(&self) -> Vec<Role> {
        Role::ALL.into_iter().filter(|r| self.contains(*r)).collect()
    }
}

impl<const N: usize> From<[Role; N]> for RoleSet {
    fn from(roles: [Role; N]) -> Self {
        Self::of(&roles)
    }
}

impl Serialize for RoleSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.roles())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("invalid API policy key '{0}': expected \"METHOD /path\"")]
    InvalidApiKey(String),

    #[error("'*' is only allowed as a trailing '/*' in '{0}'")]
    MisplacedWildcard(String),

    #[error("duplicate policy key '{0}'")]
    Duplicate(String),

    #[error("empty policy key")]
    EmptyKey,
}

/// An exact-match entry in the page or action namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRule {
    pub key: String,
    pub roles: RoleSet,
}

/// How an API rule matches request paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Exact(String),
    /// Parsed from a trailing `/*`; holds the path up to and including the
    /// final `/`.
    Prefix(String),
}

impl PathPattern {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(exact) => path == exact,
            PathPattern::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, PathPattern::Prefix(_))
    }
}

/// An entry in the API namespace, kept as a structured method/path pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRule {
    /// Original `"METHOD /path"` key, for explanations and logs.
    pub key: String,
    pub method: String,
    pub path: PathPattern,
    pub roles: RoleSet,
}

impl ApiRule {
    pub fn parse(key: &str, roles: RoleSet) -> Result<Self, PolicyError> {
        let (method, path) = key
            .split_once(' ')
            .ok_or_else(|| PolicyError::InvalidApiKey(key.to_string()))?;

        let method_ok = !method.is_empty() && method.bytes().all(|b| b.is_ascii_uppercase());
        if !method_ok || !path.starts_with('/') || path.contains(char::is_whitespace) {
            return Err(PolicyError::InvalidApiKey(key.to_string()));
        }

        let pattern = match path.strip_suffix("/*") {
            Some(base) if !base.contains('*') => PathPattern::Prefix(format!("{base}/")),
            Some(_) => return Err(PolicyError::MisplacedWildcard(key.to_string())),
            None if path.contains('*') => {
                return Err(PolicyError::MisplacedWildcard(key.to_string()));
            }
            None => PathPattern::Exact(path.to_string()),
        };

        Ok(Self {
            key: key.to_string(),
            method: method.to_string(),
            path: pattern,
            roles,
        })
    }

    /// Exact rules match on method and path. Wildcard rules match on the
    /// path prefix alone; their method only names the entry.
    pub fn matches(&self, method: &str, path: &str) -> bool {
        match &self.path {
            PathPattern::Exact(_) => self.method == method && self.path.matches(path),
            PathPattern::Prefix(_) => self.path.matches(path),
        }
    }
}

/// The three policy namespaces, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct PolicyTable {
    pages: Vec<NamedRule>,
    actions: Vec<NamedRule>,
    api: Vec<ApiRule>,
}

impl PolicyTable {
    pub fn builder() -> PolicyTableBuilder {
        PolicyTableBuilder::default()
    }

    pub fn pages(&self) -> &[NamedRule] {
        &self.pages
    }

    pub fn actions(&self) -> &[NamedRule] {
        &self.actions
    }

    pub fn api_rules(&self) -> &[ApiRule] {
        &self.api
    }

    pub fn page_rule(&self, page: &str) -> Option<&NamedRule> {
        self.pages.iter().find(|rule| rule.key == page)
    }

    pub fn action_rule(&self, action: &str) -> Option<&NamedRule> {
        self.actions.iter().find(|rule| rule.key == action)
    }

    /// Exact rules first; otherwise the first wildcard rule, in insertion
    /// order, whose prefix the path starts with, whatever the method.
    pub fn api_rule(&self, method: &str, path: &str) -> Option<&ApiRule> {
        self.api
            .iter()
            .filter(|rule| !rule.path.is_wildcard())
            .find(|rule| rule.matches(method, path))
            .or_else(|| {
                self.api
                    .iter()
                    .filter(|rule| rule.path.is_wildcard())
                    .find(|rule| rule.matches(method, path))
            })
    }
}

/// Collects entries and reports the first malformed one on [`build`].
///
/// [`build`]: PolicyTableBuilder::build
#[derive(Debug, Default)]
pub struct PolicyTableBuilder {
    table: PolicyTable,
    error: Option<PolicyError>,
}

impl PolicyTableBuilder {
    pub fn page(mut self, path: &str, roles: impl Into<RoleSet>) -> Self {
        if self.error.is_none() {
            self.error = push_named(&mut self.table.pages, path, roles.into()).err();
        }
        self
    }

    pub fn action(mut self, name: &str, roles: impl Into<RoleSet>) -> Self {
        if self.error.is_none() {
            self.error = push_named(&mut self.table.actions, name, roles.into()).err();
        }
        self
    }

    pub fn api(mut self, key: &str, roles: impl Into<RoleSet>) -> Self {
        if self.error.is_some() {
            return self;
        }
        match ApiRule::parse(key, roles.into()) {
            Ok(rule) => {
                let duplicate = self
                    .table
                    .api
                    .iter()
                    .any(|r| r.method == rule.method && r.path == rule.path);
                if duplicate {
                    self.error = Some(PolicyError::Duplicate(key.to_string()));
                } else {
                    self.table.api.push(rule);
                }
            }
            Err(e) => self.error = Some(e),
        }
        self
    }

    pub fn build(self) -> Result<PolicyTable, PolicyError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.table),
        }
    }
}

fn push_named(rules: &mut Vec<NamedRule>, key: &str, roles: RoleSet) -> Result<(), PolicyError> {
    if key.is_empty() {
        return Err(PolicyError::EmptyKey);
    }
    if rules.iter().any(|r| r.key == key) {
        return Err(PolicyError::Duplicate(key.to_string()));
    }
    rules.push(NamedRule {
        key: key.to_string(),
        roles,
    });
    Ok(())
}

impl PolicyTable {
    /// The back office's built-in policy.
    pub fn standard() -> Self {
        use Role::{Admin, Editor, Member, SuperAdmin};

        const STAFF: [Role; 3] = [SuperAdmin, Admin, Editor];
        const ADMINS: [Role; 2] = [SuperAdmin, Admin];
        const SUPER_ONLY: [Role; 1] = [SuperAdmin];

        Self::builder()
            // Pages
            .page("/admin", STAFF)
            .page("/admin/profile", [SuperAdmin, Admin, Editor, Member])
            .page("/admin/announcements", STAFF)
            .page("/admin/events", STAFF)
            .page("/admin/datasets", STAFF)
            .page("/admin/members", ADMINS)
            .page("/admin/contact-messages", ADMINS)
            .page("/admin/users", SUPER_ONLY)
            .page("/admin/settings", SUPER_ONLY)
            // Action palette
            .action("announcement.create", STAFF)
            .action("announcement.publish", ADMINS)
            .action("announcement.delete", ADMINS)
            .action("event.create", STAFF)
            .action("event.delete", ADMINS)
            .action("dataset.upload", STAFF)
            .action("dataset.delete", ADMINS)
            .action("member.invite", ADMINS)
            .action("member.remove", SUPER_ONLY)
            .action("contact-message.archive", ADMINS)
            .action("contact-message.delete", SUPER_ONLY)
            .action("user.change-role", SUPER_ONLY)
            .action("settings.edit", SUPER_ONLY)
            // API
            .api("GET /api/announcements", STAFF)
            .api("POST /api/announcements", STAFF)
            // A wildcard covers every method under its prefix and the first
            // one wins, so each prefix gets a single entry at its strictest.
            .api("PUT /api/announcements/*", ADMINS)
            .api("GET /api/events", STAFF)
            .api("POST /api/events", STAFF)
            .api("DELETE /api/events/*", ADMINS)
            .api("GET /api/datasets", STAFF)
            .api("POST /api/datasets", STAFF)
            .api("DELETE /api/datasets/*", ADMINS)
            .api("GET /api/members", ADMINS)
            .api("POST /api/members", ADMINS)
            .api("DELETE /api/members/*", SUPER_ONLY)
            .api("GET /api/contact-messages", ADMINS)
            .api("DELETE /api/contact-messages/*", SUPER_ONLY)
            .api("GET /api/users", SUPER_ONLY)
            .api("PUT /api/users/*", SUPER_ONLY)
            .api("GET /api/settings", ADMINS)
            .api("PUT /api/settings", SUPER_ONLY)
            .build()
            .expect("built-in policy table is well-formed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_set_membership() {
        let set = RoleSet::from([Role::Admin, Role::Member]);
        assert!(set.contains(Role::Admin));
        assert!(set.contains(Role::Member));
        assert!(!set.contains(Role::Editor));
        assert_eq!(set.roles(), vec![Role::Admin, Role::Member]);
        assert!(RoleSet::EMPTY.is_empty());
    }

    #[test]
    fn role_set_serializes_as_names() {
        let set = RoleSet::from([Role::SuperAdmin, Role::Admin]);
        assert_eq!(
            serde_json::to_value(set).unwrap(),
            serde_json::json!(["SUPER_ADMIN", "ADMIN"])
        );
    }

    #[test]
    fn api_key_parses_into_method_and_pattern() {
        let rule = ApiRule::parse("PUT /api/members/*", RoleSet::EMPTY).unwrap();
        assert_eq!(rule.method, "PUT");
        assert_eq!(rule.path, PathPattern::Prefix("/api/members/".to_string()));

        let rule = ApiRule::parse("GET /api/members", RoleSet::EMPTY).unwrap();
        assert_eq!(rule.path, PathPattern::Exact("/api/members".to_string()));
    }

    #[test]
    fn malformed_api_keys_rejected() {
        for key in ["/api/members", "get /api/x", "GET api/x", " /api", "GET /a b", "GET"] {
            assert_eq!(
                ApiRule::parse(key, RoleSet::EMPTY).unwrap_err(),
                PolicyError::InvalidApiKey(key.to_string()),
                "{key}"
            );
        }
        for key in ["GET /api/*/x", "GET /api/x*", "GET /api/*/*"] {
            assert_eq!(
                ApiRule::parse(key, RoleSet::EMPTY).unwrap_err(),
                PolicyError::MisplacedWildcard(key.to_string()),
                "{key}"
            );
        }
    }

    #[test]
    fn wildcard_prefix_keeps_trailing_slash() {
        let rule = ApiRule::parse("PUT /api/members/*", RoleSet::EMPTY).unwrap();
        assert!(rule.matches("PUT", "/api/members/123"));
        assert!(rule.matches("PUT", "/api/members/abc-def"));
        assert!(!rule.matches("PUT", "/api/members2/123"));
        assert!(!rule.matches("PUT", "/api/members"));
    }

    #[test]
    fn wildcard_ignores_method_but_exact_does_not() {
        let rule = ApiRule::parse("PUT /api/members/*", RoleSet::EMPTY).unwrap();
        assert!(rule.matches("GET", "/api/members/123"));
        assert!(rule.matches("DELETE", "/api/members/123"));

        let rule = ApiRule::parse("GET /api/members", RoleSet::EMPTY).unwrap();
        assert!(rule.matches("GET", "/api/members"));
        assert!(!rule.matches("POST", "/api/members"));
    }

    #[test]
    fn first_wildcard_wins_across_methods() {
        let table = PolicyTable::builder()
            .api("PUT /api/items/*", [Role::Admin])
            .api("DELETE /api/items/*", [Role::Member])
            .build()
            .unwrap();
        let rule = table.api_rule("DELETE", "/api/items/1").unwrap();
        assert_eq!(rule.key, "PUT /api/items/*");
        assert_eq!(table.api_rule("DELETE", "/api/items"), None);
    }

    #[test]
    fn exact_rule_preferred_over_earlier_wildcard() {
        let table = PolicyTable::builder()
            .api("GET /api/items/*", [Role::Admin])
            .api("GET /api/items/special", [Role::Member])
            .build()
            .unwrap();
        let rule = table.api_rule("GET", "/api/items/special").unwrap();
        assert_eq!(rule.key, "GET /api/items/special");
    }

    #[test]
    fn first_wildcard_wins() {
        let table = PolicyTable::builder()
            .api("GET /api/items/*", [Role::Admin])
            .api("GET /api/items/nested/*", [Role::Member])
            .build()
            .unwrap();
        let rule = table.api_rule("GET", "/api/items/nested/1").unwrap();
        assert_eq!(rule.key, "GET /api/items/*");
    }

    #[test]
    fn duplicates_and_empty_keys_rejected() {
        let err = PolicyTable::builder()
            .page("/admin", [Role::Admin])
            .page("/admin", [Role::Editor])
            .build()
            .unwrap_err();
        assert_eq!(err, PolicyError::Duplicate("/admin".to_string()));

        let err = PolicyTable::builder()
            .api("GET /x", [Role::Admin])
            .api("GET /x", [Role::Editor])
            .build()
            .unwrap_err();
        assert_eq!(err, PolicyError::Duplicate("GET /x".to_string()));

        let err = PolicyTable::builder().action("", [Role::Admin]).build().unwrap_err();
        assert_eq!(err, PolicyError::EmptyKey);
    }

    #[test]
    fn first_error_is_reported() {
        let err = PolicyTable::builder()
            .api("nonsense", [Role::Admin])
            .page("", [Role::Admin])
            .build()
            .unwrap_err();
        assert_eq!(err, PolicyError::InvalidApiKey("nonsense".to_string()));
    }

    #[test]
    fn standard_table_builds() {
        let table = PolicyTable::standard();
        assert!(table.page_rule("/admin/settings").is_some());
        assert!(table.action_rule("announcement.create").is_some());
        assert!(table.api_rule("DELETE", "/api/contact-messages/42").is_some());
        assert!(table.api_rule("GET", "/api/unknown").is_none());
    }
}
