use serde::{Deserialize, Serialize};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExplainQuery {
    pub method: Option<String>,
    pub path: Option<String>,
    pub page: Option<String>,
    pub action: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginPageQuery {
    pub from: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub path: String,
    pub title: String,
}

impl NavItem {
    pub fn for_page(path: &str) -> Self {
        Self {
            path: path.to_string(),
            title: page_title(path),
        }
    }
}

/// `/admin/contact-messages` -> `Contact messages`; the root is the dashboard.
pub fn page_title(path: &str) -> String {
    let last = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    if last.is_empty() || last == "admin" {
        return "Dashboard".to_string();
    }
    let words = last.replace('-', " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Only same-site absolute paths survive as a post-login target.
pub fn safe_return_target(from: Option<&str>, fallback: &str) -> String {
    match from {
        Some(target)
            if target.starts_with('/')
                && !target.starts_with("//")
                && !target.contains('\\') =>
        {
            target.to_string()
        }
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_from_paths() {
        assert_eq!(page_title("/admin"), "Dashboard");
        assert_eq!(page_title("/admin/"), "Dashboard");
        assert_eq!(page_title("/admin/events"), "Events");
        assert_eq!(page_title("/admin/contact-messages"), "Contact messages");
    }

    #[test]
    fn return_target_rejects_offsite() {
        assert_eq!(safe_return_target(Some("/admin/events?tab=1"), "/admin"), "/admin/events?tab=1");
        assert_eq!(safe_return_target(Some("//evil.example"), "/admin"), "/admin");
        assert_eq!(safe_return_target(Some("https://evil.example"), "/admin"), "/admin");
        assert_eq!(safe_return_target(Some("/\\evil.example"), "/admin"), "/admin");
        assert_eq!(safe_return_target(None, "/admin"), "/admin");
    }
}
