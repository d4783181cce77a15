//! Session endpoints: login, logout, whoami.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::app::{AppState, dto::LoginRequest, errors};
use crate::context::SessionContext;
use crate::cookies::HeaderCookieJar;

/// POST /api/auth/login
pub async fn login(
    Extension(state): Extension<AppState>,
    Json(body): Json<LoginRequest>,
) -> Response {
    let Some(identity) = state.credentials.verify(&body.email, &body.password).await else {
        info!("login rejected");
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "invalid email or password",
        );
    };

    let mut jar = HeaderCookieJar::default();
    let principal = state.sessions.create(identity, &mut jar);

    let mut response = (StatusCode::OK, Json(principal)).into_response();
    jar.write_to(response.headers_mut());
    response
}

/// POST /api/auth/logout - always succeeds, session or not.
pub async fn logout(Extension(state): Extension<AppState>) -> Response {
    let mut jar = HeaderCookieJar::default();
    state.sessions.destroy(&mut jar);
    info!("session cleared");

    let mut response = StatusCode::NO_CONTENT.into_response();
    jar.write_to(response.headers_mut());
    response
}

/// GET /api/auth/me
pub async fn me(Extension(session): Extension<SessionContext>) -> impl IntoResponse {
    Json(session.into_principal())
}
