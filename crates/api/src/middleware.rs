//! Request guards, attached with `axum::middleware::from_fn_with_state`.
//!
//! Each guard decodes the session on its own; none trusts an earlier layer.

use axum::{
    extract::{OriginalUri, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, info};

use gatehouse_auth::{Decision, Denial};
use gatehouse_core::AccessError;
use gatehouse_edge::GateOutcome;

use crate::app::{AppState, errors};
use crate::context::SessionContext;
use crate::cookies::HeaderCookieJar;

/// Path as the client sent it, even inside a nested router.
fn request_path(req: &Request) -> String {
    match req.extensions().get::<OriginalUri>() {
        Some(OriginalUri(uri)) => uri.path().to_string(),
        None => req.uri().path().to_string(),
    }
}

fn request_target(req: &Request) -> String {
    let uri = match req.extensions().get::<OriginalUri>() {
        Some(OriginalUri(uri)) => uri,
        None => req.uri(),
    };
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

/// Outermost layer: the same check the edge runtime performs, so protected
/// pages bounce to the login page before any handler runs.
pub async fn edge_gate(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let target = request_target(&req);
    let jar = HeaderCookieJar::from_headers(req.headers());

    match state.gate.evaluate(&target, jar.header()).await {
        GateOutcome::Public | GateOutcome::Proceed(_) => next.run(req).await,
        GateOutcome::Redirect(location) => Redirect::temporary(&location).into_response(),
    }
}

/// 401 unless the request carries a valid session; exposes it as
/// `SessionContext` to inner layers and handlers.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let jar = HeaderCookieJar::from_headers(req.headers());
    let Some(principal) = state.sessions.read(&jar) else {
        return errors::access_error_to_response(AccessError::Unauthenticated);
    };

    req.extensions_mut().insert(SessionContext::new(principal));
    next.run(req).await
}

/// 403 unless the API table admits the caller for this method and path.
///
/// Runs inside `require_session`. A missing entry denies exactly like a
/// role mismatch.
pub async fn require_api_policy(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let Some(role) = req.extensions().get::<SessionContext>().map(|s| s.role()) else {
        return errors::access_error_to_response(AccessError::Unauthenticated);
    };
    let path = request_path(&req);
    let method = req.method().as_str().to_string();

    match state.policy.check_api(role, &method, &path) {
        Decision::Allow(grant) => {
            debug!(%role, %method, %path, ?grant, "api call allowed");
            next.run(req).await
        }
        Decision::Deny(denial) => {
            info!(%role, %method, %path, ?denial, "api call denied");
            errors::access_error_to_response(AccessError::Forbidden)
        }
    }
}

/// Page guard: no session redirects to login, a role the page does not
/// admit is 403, a page the table does not know is 404.
pub async fn require_page_access(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = request_path(&req);
    let jar = HeaderCookieJar::from_headers(req.headers());
    let Some(principal) = state.sessions.read(&jar) else {
        let location = state.gate.login_redirect(&request_target(&req));
        return Redirect::temporary(&location).into_response();
    };

    match state.policy.check_page(principal.role, &path) {
        Decision::Allow(_) => {
            req.extensions_mut().insert(SessionContext::new(principal));
            next.run(req).await
        }
        Decision::Deny(Denial::NotPermitted) => {
            info!(role = %principal.role, %path, "page denied");
            errors::access_error_to_response(AccessError::Forbidden)
        }
        Decision::Deny(Denial::NoPolicy) => {
            debug!(%path, "no page entry");
            errors::not_found()
        }
    }
}
