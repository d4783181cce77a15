//! Role-aware UI feeds and the authorization explainer.
//!
//! These only need a session: they describe the caller's own permissions,
//! so there is no API entry to check them against.

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use gatehouse_auth::{Resource, explain_authorization};

use crate::app::{
    AppState,
    dto::{ExplainQuery, NavItem},
    errors,
};
use crate::context::SessionContext;

/// GET /api/navigation - pages the caller may open, in table order
pub async fn navigation(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<SessionContext>,
) -> impl IntoResponse {
    let items: Vec<NavItem> = state
        .policy
        .allowed_pages(session.role())
        .into_iter()
        .map(NavItem::for_page)
        .collect();

    Json(json!({
        "role": session.role(),
        "items": items,
    }))
}

/// GET /api/actions - palette actions the caller may run
pub async fn actions(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<SessionContext>,
) -> impl IntoResponse {
    Json(json!({
        "role": session.role(),
        "actions": state.policy.allowed_actions(session.role()),
    }))
}

/// GET /api/authz/explain?method=&path= | ?page= | ?action=
pub async fn explain(
    Extension(state): Extension<AppState>,
    Extension(session): Extension<SessionContext>,
    Query(query): Query<ExplainQuery>,
) -> Response {
    let method = query.method.as_deref().map(str::to_ascii_uppercase);
    let resource = match (&method, &query.path, &query.page, &query.action) {
        (Some(method), Some(path), None, None) => Resource::Api { method, path },
        (None, None, Some(page), None) => Resource::Page(page),
        (None, None, None, Some(action)) => Resource::Action(action),
        _ => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_query",
                "give exactly one of: method and path, page, action",
            );
        }
    };

    let explanation = explain_authorization(&state.policy, session.role(), resource);
    (StatusCode::OK, Json(explanation)).into_response()
}
