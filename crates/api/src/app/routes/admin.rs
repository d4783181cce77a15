//! Back-office page descriptors.
//!
//! Rendering is left to the frontend; these handlers describe what the
//! signed-in caller may see and do on each page.

use axum::{
    extract::{Extension, OriginalUri, Query},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::app::{
    AppState,
    dto::{LoginPageQuery, NavItem, page_title, safe_return_target},
};
use crate::context::SessionContext;

/// GET /admin, GET /admin/:section
pub async fn page(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<SessionContext>,
    OriginalUri(uri): OriginalUri,
) -> impl IntoResponse {
    let role = session.role();
    let navigation: Vec<NavItem> = state
        .policy
        .allowed_pages(role)
        .into_iter()
        .map(NavItem::for_page)
        .collect();

    Json(json!({
        "page": uri.path(),
        "title": page_title(uri.path()),
        "viewer": session.principal(),
        "navigation": navigation,
        "actions": state.policy.allowed_actions(role),
    }))
}

/// GET /admin/login - reachable without a session
pub async fn login_page(
    Extension(state): Extension<AppState>,
    Query(query): Query<LoginPageQuery>,
) -> impl IntoResponse {
    let config = state.gate.config();
    let fallback = config
        .protected_prefixes
        .first()
        .map(String::as_str)
        .unwrap_or("/");

    Json(json!({
        "page": config.login_path,
        "title": "Sign in",
        "returnTo": safe_return_target(query.from.as_deref(), fallback),
    }))
}
